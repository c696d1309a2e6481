//! Ordered prefix/pattern dispatch over the User-Agent string.
//!
//! # Responsibilities
//! - Resolve the device category (first match wins: feature-phone prefixes,
//!   Apple handhelds, Android, PHS, then PC as the catch-all)
//! - Extract os / browser / model / carrier where a family pattern matches
//! - Degrade gracefully: a handset that matches a family but defeats the
//!   field patterns keeps its category with empty fields
//!
//! # Design Decisions
//! - One pure function instead of a class hierarchy; every pattern is
//!   unit-testable in isolation
//! - Field extraction runs under `catch_unwind` so no User-Agent, however
//!   malformed, can fail the request

use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

use crate::device::descriptor::{Carrier, DeviceCategory, DeviceDescriptor};

const MOBILE_PREFIXES: [&str; 5] = ["DoCoMo", "KDDI", "J-PHONE", "SoftBank", "Vodafone"];

static KDDI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^KDDI-([a-zA-Z0-9]{4}) .+$").expect("kddi pattern"));

static SOFTBANK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z\-]+/[0-9.]+/([a-zA-Z0-9]+)/.+$").expect("softbank pattern")
});

static APPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^.*\(([a-zA-Z]+); U; CPU (.*); [a-z_\-]+\) AppleWebKit/[0-9.]+ \([a-zA-Z, ]+\)(.*)$",
    )
    .expect("apple pattern")
});

static ANDROID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*(Android [^;]*); [a-z_\-]*;?(.*) Build/(.*)$").expect("android pattern"));

static ANDROID_BROWSER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.* (Version/.*)$").expect("android browser pattern"));

/// Classify a raw User-Agent string into a [`DeviceDescriptor`].
///
/// Never fails the caller: an empty or unrecognized User-Agent is a PC, and
/// a panic during field extraction is logged once and yields the matched
/// category with default fields.
pub fn classify(user_agent: &str) -> DeviceDescriptor {
    let category = resolve_category(user_agent);
    match panic::catch_unwind(AssertUnwindSafe(|| parse(category, user_agent))) {
        Ok(descriptor) => descriptor,
        Err(_) => {
            error!(
                code = "ua-parse-failed",
                user_agent, "user-agent field extraction failed"
            );
            DeviceDescriptor::new(category)
        }
    }
}

fn resolve_category(ua: &str) -> DeviceCategory {
    if MOBILE_PREFIXES.iter().any(|p| ua.starts_with(p)) {
        DeviceCategory::Mobile
    } else if ua.contains("iPhone;") || ua.contains("iPod;") {
        DeviceCategory::Iphone
    } else if ua.contains("iPad;") {
        DeviceCategory::Ipad
    } else if ua.contains("Android") {
        DeviceCategory::Android
    } else if ua.contains("WILLCOM;") || ua.contains("DDIPOCKET;") {
        DeviceCategory::Phs
    } else {
        DeviceCategory::Pc
    }
}

fn parse(category: DeviceCategory, ua: &str) -> DeviceDescriptor {
    let mut descriptor = DeviceDescriptor::new(category);
    match category {
        DeviceCategory::Mobile => parse_mobile(&mut descriptor, ua),
        DeviceCategory::Iphone | DeviceCategory::Ipad => parse_apple(&mut descriptor, ua),
        DeviceCategory::Android => parse_android(&mut descriptor, ua),
        DeviceCategory::Phs | DeviceCategory::Pc => {}
    }
    descriptor
}

fn parse_mobile(descriptor: &mut DeviceDescriptor, ua: &str) {
    if ua.starts_with("DoCoMo") {
        if let Some(rest) = ua.strip_prefix("DoCoMo/1.0/") {
            // i-mode browser 1.0, reduced-markup generation
            let model = match rest.find('/') {
                Some(idx) if idx > 0 => &rest[..idx],
                _ => rest,
            };
            descriptor.set_model(model);
            descriptor.legacy_capability = true;
        } else if let Some(rest) = ua.strip_prefix("DoCoMo/2.0 ") {
            let model = match rest.find('(') {
                Some(idx) if idx > 0 => &rest[..idx],
                _ => rest,
            };
            descriptor.set_model(model);
        }
        descriptor.carrier = Some(Carrier::Docomo);
    } else if ua.starts_with("KDDI") {
        if let Some(caps) = KDDI_RE.captures(ua) {
            let model = &caps[1];
            // 3rd character '2' marks a 2nd-generation handset
            if model.as_bytes()[2] == b'2' {
                descriptor.legacy_capability = true;
            }
            descriptor.set_model(model);
        }
        descriptor.carrier = Some(Carrier::Au);
    } else {
        if let Some(caps) = SOFTBANK_RE.captures(ua) {
            descriptor.set_model(&caps[1]);
        }
        descriptor.legacy_capability = ua.starts_with("J-PHONE");
        descriptor.carrier = Some(Carrier::Softbank);
    }
}

fn parse_apple(descriptor: &mut DeviceDescriptor, ua: &str) {
    if let Some(caps) = APPLE_RE.captures(ua) {
        descriptor.set_model(&caps[1]);
        descriptor.set_os(&caps[2]);
        descriptor.set_browser(&caps[3]);
    }
}

fn parse_android(descriptor: &mut DeviceDescriptor, ua: &str) {
    if let Some(caps) = ANDROID_RE.captures(ua) {
        descriptor.set_os(&caps[1]);
        descriptor.set_model(&caps[2]);
        if !caps[3].trim().is_empty() {
            // Only a Version/ token counts as a browser; anything else in
            // the capture is build noise and is discarded.
            if let Some(refined) = ANDROID_BROWSER_RE.captures(ua) {
                descriptor.set_browser(&refined[1]);
            }
        }
    }
}
