//! Scripted operator input for simulation runs.
//!
//! ```toml
//! [[step]]
//! cycles = 10
//! buttons = [5, 4]
//! axes = [[1, -0.5]]
//! ```
use serde::Deserialize;

use crate::{MAX_AXIS_ID, MAX_BUTTON_ID};

/// One held input state, repeated for `cycles` control cycles.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScriptStep {
    pub cycles: u32,
    #[serde(default)]
    pub buttons: Vec<usize>,
    /// `[axis id, value]` pairs; unlisted axes read 0.0.
    #[serde(default)]
    pub axes: Vec<(usize, f64)>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct InputScript {
    #[serde(rename = "step", default)]
    pub steps: Vec<ScriptStep>,
}

impl InputScript {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.steps.is_empty() {
            eyre::bail!("script must contain at least one [[step]]");
        }
        for (idx, s) in self.steps.iter().enumerate() {
            if let Some(b) = s.buttons.iter().find(|b| !(1..=MAX_BUTTON_ID).contains(*b)) {
                eyre::bail!("step {idx}: button {b} must be in 1..={MAX_BUTTON_ID}");
            }
            for (axis, value) in &s.axes {
                if *axis > MAX_AXIS_ID {
                    eyre::bail!("step {idx}: axis {axis} must be in 0..={MAX_AXIS_ID}");
                }
                if !value.is_finite() {
                    eyre::bail!("step {idx}: axis {axis} value must be finite");
                }
            }
        }
        Ok(())
    }

    /// Total number of cycles the script covers.
    pub fn total_cycles(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.cycles)).sum()
    }
}

pub fn load_script_toml(s: &str) -> Result<InputScript, toml::de::Error> {
    toml::from_str::<InputScript>(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps_and_rejects_bad_buttons() {
        let script = load_script_toml(
            r"
            [[step]]
            cycles = 3
            buttons = [5]
            axes = [[1, -0.25]]

            [[step]]
            cycles = 2
            ",
        )
        .unwrap();
        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[0].axes, vec![(1, -0.25)]);
        assert!(script.steps[1].buttons.is_empty());
        assert_eq!(script.total_cycles(), 5);
        script.validate().unwrap();

        let bad = load_script_toml("[[step]]\ncycles = 1\nbuttons = [12]\n").unwrap();
        assert!(bad.validate().is_err());
        assert!(InputScript::default().validate().is_err());
    }
}
