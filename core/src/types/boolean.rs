use crate::error::Failure;
use crate::value::Value;

use super::{Raw, SwitchFlag, ValueSpec, ValueType, long_switch, short_switch};

/// On/off switch with a negated form.
///
/// Declares `--name` (true), `--no-name` (false) and `-a` (true) per alias.
/// Never captures a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boolean;

impl ValueType for Boolean {
    fn name(&self) -> String {
        "boolean".to_string()
    }

    fn parse(&self, flag: SwitchFlag, _raw: Raw<'_>) -> Result<Value, Failure> {
        Ok(Value::Bool(flag != SwitchFlag::Negated))
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::Boolean
    }

    fn capture(&self, _flag: SwitchFlag) -> bool {
        false
    }

    fn switches(&self, name: &str, aliases: &[char]) -> Vec<(String, SwitchFlag)> {
        let long = long_switch(name);
        let negated = format!("--no-{}", &long[2..]);
        let mut switches = vec![(long, SwitchFlag::Primary), (negated, SwitchFlag::Negated)];
        switches.extend(
            aliases
                .iter()
                .map(|&alias| (short_switch(alias), SwitchFlag::Primary)),
        );
        switches
    }
}

/// Occurrence counter (`-v -v -v` gives 3).
///
/// Each occurrence bumps a tally kept by the parser; the value reported is
/// the tally at the last occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Count;

impl ValueType for Count {
    fn name(&self) -> String {
        "count".to_string()
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        match raw {
            Raw::Tally(n) if n > 0 => Ok(Value::Count(n)),
            _ => Err(Failure::Generic),
        }
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::Count
    }

    fn capture(&self, _flag: SwitchFlag) -> bool {
        false
    }

    fn cumulative(&self) -> bool {
        true
    }
}
