//! # Reminder Catalog
//!
//! The closed set of reminder types and the literal text delivered for each.
//! Texts ship built in and can be overridden from a YAML file.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Kind of devotional reminder a user can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    Hawqala,
    Istighfar,
    SalahOnProphet,
    IbrahimicSalah,
    Tasbih,
    DuaYunus,
}

impl ReminderType {
    /// Every reminder type, in menu order
    pub const ALL: [ReminderType; 6] = [
        ReminderType::Hawqala,
        ReminderType::Istighfar,
        ReminderType::SalahOnProphet,
        ReminderType::IbrahimicSalah,
        ReminderType::Tasbih,
        ReminderType::DuaYunus,
    ];

    /// Stable key used in storage and button tags
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::Hawqala => "hawqala",
            ReminderType::Istighfar => "istighfar",
            ReminderType::SalahOnProphet => "salah_on_prophet",
            ReminderType::IbrahimicSalah => "ibrahimic_salah",
            ReminderType::Tasbih => "tasbih",
            ReminderType::DuaYunus => "dua_yunus",
        }
    }

    /// Button label shown in the wizard
    pub fn label(&self) -> &'static str {
        match self {
            ReminderType::Hawqala => "Hawqala",
            ReminderType::Istighfar => "Istighfar",
            ReminderType::SalahOnProphet => "Salah on the Prophet ﷺ",
            ReminderType::IbrahimicSalah => "Ibrahimic Salah",
            ReminderType::Tasbih => "Tasbih",
            ReminderType::DuaYunus => "Dua of Yunus",
        }
    }

    /// Built-in text delivered for this type
    pub fn default_text(&self) -> &'static str {
        match self {
            ReminderType::Hawqala => "لا حول ولا قوة إلا بالله",
            ReminderType::Istighfar => "أستغفر الله العظيم وأتوب إليه",
            ReminderType::SalahOnProphet => "اللهم صل وسلم على نبينا محمد",
            ReminderType::IbrahimicSalah => {
                "اللهم صل على محمد وعلى آل محمد كما صليت على إبراهيم وعلى آل إبراهيم إنك حميد مجيد، \
                 اللهم بارك على محمد وعلى آل محمد كما باركت على إبراهيم وعلى آل إبراهيم إنك حميد مجيد"
            }
            ReminderType::Tasbih => "سبحان الله وبحمده، سبحان الله العظيم",
            ReminderType::DuaYunus => "لا إله إلا أنت سبحانك إني كنت من الظالمين",
        }
    }
}

impl std::fmt::Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReminderType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        ReminderType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown reminder type: {}", s))
    }
}

/// Overrides file layout: `texts: { <reminder_type>: <text> }`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub texts: HashMap<ReminderType, String>,
}

/// Resolved texts for every reminder type
#[derive(Debug, Clone)]
pub struct ReminderCatalog {
    texts: HashMap<ReminderType, String>,
}

impl ReminderCatalog {
    /// Catalog holding only the built-in texts
    pub fn builtin() -> Self {
        let texts = ReminderType::ALL
            .iter()
            .map(|t| (*t, t.default_text().to_string()))
            .collect();
        Self { texts }
    }

    /// Load overrides from a YAML file, falling back to built-ins when it is absent
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!("📄 No reminder overrides at {path} - using built-in texts");
            return Ok(Self::builtin());
        }

        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml(&contents)?;
        info!("📄 Loaded reminder text overrides from {path}");
        Ok(catalog)
    }

    /// Parse and validate an overrides document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(contents)?;
        let mut catalog = Self::builtin();

        for (reminder_type, text) in file.texts {
            let text = text.trim();
            if text.is_empty() {
                return Err(anyhow::anyhow!(
                    "Reminder text for {} must not be empty",
                    reminder_type
                ));
            }
            if text.chars().count() > MESSAGE_LIMIT {
                return Err(anyhow::anyhow!(
                    "Reminder text for {} exceeds {} characters",
                    reminder_type,
                    MESSAGE_LIMIT
                ));
            }
            catalog.texts.insert(reminder_type, text.to_string());
        }

        Ok(catalog)
    }

    /// Text delivered for a reminder type
    pub fn text(&self, reminder_type: ReminderType) -> &str {
        self.texts
            .get(&reminder_type)
            .map(String::as_str)
            .unwrap_or_else(|| reminder_type.default_text())
    }
}

impl Default for ReminderCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
