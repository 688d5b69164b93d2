//! On-demand istighfar for a specific sin
//!
//! A user names a sin, either from a short list of common ones or in their own
//! words, and gets the istighfar formula for it back immediately. Nothing is stored.
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.1.0

use crate::core::SinError;

/// Longest free-text sin accepted
pub const MAX_SIN_CHARS: usize = 200;

/// Sins offered as buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonSin {
    Backbiting,
    Talebearing,
    Insulting,
}

impl CommonSin {
    pub const ALL: [CommonSin; 3] = [
        CommonSin::Backbiting,
        CommonSin::Talebearing,
        CommonSin::Insulting,
    ];

    /// Stable key used in button tags
    pub fn as_str(&self) -> &'static str {
        match self {
            CommonSin::Backbiting => "ghiba",
            CommonSin::Talebearing => "namima",
            CommonSin::Insulting => "sabb",
        }
    }

    /// Arabic name, used both as label and inside the formula
    pub fn name(&self) -> &'static str {
        match self {
            CommonSin::Backbiting => "الغيبة",
            CommonSin::Talebearing => "النميمة",
            CommonSin::Insulting => "السب والشتم",
        }
    }
}

impl std::fmt::Display for CommonSin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommonSin {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        CommonSin::ALL
            .iter()
            .copied()
            .find(|sin| sin.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown sin: {}", s))
    }
}

/// The istighfar formula for a named sin
pub fn istighfar_for(sin: &str) -> String {
    format!("استغفر الله العظيم من ذنب {sin} وأتوب إليه ✨")
}

/// Validate a sin typed by the user
pub fn parse_custom_sin(input: &str) -> Result<String, SinError> {
    let sin = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if sin.is_empty() {
        return Err(SinError::Empty);
    }
    if sin.chars().count() > MAX_SIN_CHARS {
        return Err(SinError::TooLong { max: MAX_SIN_CHARS });
    }
    Ok(sin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_sin_keys_parse_back() {
        for sin in CommonSin::ALL {
            assert_eq!(sin.as_str().parse::<CommonSin>().unwrap(), sin);
        }
        assert!("riba".parse::<CommonSin>().is_err());
    }

    #[test]
    fn test_formula_names_the_sin() {
        assert_eq!(
            istighfar_for(CommonSin::Backbiting.name()),
            "استغفر الله العظيم من ذنب الغيبة وأتوب إليه ✨"
        );
    }

    #[test]
    fn test_custom_sin_is_normalised_and_bounded() {
        assert_eq!(parse_custom_sin("  الكذب \n"), Ok("الكذب".to_string()));
        assert_eq!(parse_custom_sin("   "), Err(SinError::Empty));
        let long = "ذ".repeat(MAX_SIN_CHARS + 1);
        assert_eq!(
            parse_custom_sin(&long),
            Err(SinError::TooLong { max: MAX_SIN_CHARS })
        );
    }
}
