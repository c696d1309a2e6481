//! Typed device descriptor produced by User-Agent classification.

use std::fmt;

/// Device family resolved from the User-Agent header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCategory {
    /// Desktop browsers and anything unrecognized.
    Pc,
    /// Japanese feature phones (DoCoMo, au, SoftBank).
    Mobile,
    /// iPhone / iPod touch.
    Iphone,
    /// iPad.
    Ipad,
    /// Android handsets and tablets.
    Android,
    /// WILLCOM / DDIPOCKET PHS handsets.
    Phs,
}

impl DeviceCategory {
    /// Short label used in access logs.
    pub fn label(&self) -> &'static str {
        match self {
            DeviceCategory::Pc => "Pc",
            DeviceCategory::Mobile => "Mobile",
            DeviceCategory::Iphone => "Iphone",
            DeviceCategory::Ipad => "Ipad",
            DeviceCategory::Android => "Android",
            DeviceCategory::Phs => "Phs",
        }
    }
}

/// Mobile network operator inferred from the User-Agent prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Docomo,
    Au,
    Softbank,
}

impl Carrier {
    /// Display name as it historically appears in handset documentation.
    pub fn name(&self) -> &'static str {
        match self {
            Carrier::Docomo => "DoCoMo",
            Carrier::Au => "au",
            Carrier::Softbank => "SoftBank",
        }
    }
}

/// Immutable per-request device descriptor.
///
/// Constructed once from the raw User-Agent string. Absent fields are empty
/// strings, never sentinels; `carrier` is present only for feature phones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub category: DeviceCategory,
    pub os: String,
    pub browser: String,
    pub model: String,
    pub carrier: Option<Carrier>,
    /// Reduced-markup browser generation ("poor" handsets). Meaningful only
    /// for `Mobile`.
    pub legacy_capability: bool,
}

impl DeviceDescriptor {
    pub(crate) fn new(category: DeviceCategory) -> Self {
        Self {
            category,
            os: String::new(),
            browser: String::new(),
            model: String::new(),
            carrier: None,
            legacy_capability: false,
        }
    }

    pub(crate) fn set_os(&mut self, os: &str) {
        self.os = os.trim().to_string();
    }

    pub(crate) fn set_browser(&mut self, browser: &str) {
        self.browser = browser.trim().to_string();
    }

    pub(crate) fn set_model(&mut self, model: &str) {
        self.model = model.trim().to_string();
    }

    pub fn is_docomo(&self) -> bool {
        self.carrier == Some(Carrier::Docomo)
    }

    pub fn is_au(&self) -> bool {
        self.carrier == Some(Carrier::Au)
    }

    pub fn is_softbank(&self) -> bool {
        self.carrier == Some(Carrier::Softbank)
    }

    /// Carrier display name, empty for non-phone devices.
    pub fn carrier_name(&self) -> &'static str {
        self.carrier.map(|c| c.name()).unwrap_or("")
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [os={}, model={}, browser={}]",
            self.category.label(),
            self.os,
            self.model,
            self.browser
        )
    }
}
