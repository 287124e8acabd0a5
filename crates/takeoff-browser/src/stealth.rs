//! Anti-automation-detection page preparation.
//!
//! Aspire's login page refuses obviously-automated browsers, so sessions
//! can hide the webdriver flag and present a plausible client-hint set
//! before any navigation happens.

use std::collections::HashMap;

/// Init script injected on every new document: hides `navigator.webdriver`
/// and spoofs the browser environment fields detection scripts probe.
pub const STEALTH_INIT_SCRIPT: &str = r#"
// Hide webdriver
Object.defineProperty(navigator, 'webdriver', { get: () => false });

// Spoof browser environment
window.chrome = { runtime: {} };
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3] });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
"#;

/// Client-hint headers matching a current desktop Chrome.
pub fn stealth_headers() -> HashMap<String, String> {
    HashMap::from([
        (
            "sec-ch-ua".to_string(),
            r#""Google Chrome";v="135", "Not-A.Brand";v="8", "Chromium";v="135""#.to_string(),
        ),
        ("sec-ch-ua-mobile".to_string(), "?0".to_string()),
        ("sec-ch-ua-platform".to_string(), r#""macOS""#.to_string()),
    ])
}
