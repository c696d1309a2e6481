//! Accumulating URL builder for forward and redirect targets.

use url::form_urlencoded;

/// A target path with query parameters collected before serialization.
///
/// Parameters keep insertion order and are percent-encoded exactly once,
/// when [`PageUrl::render`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    path: String,
    params: Vec<(String, String)>,
    fragment: Option<String>,
}

impl PageUrl {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            fragment: None,
        }
    }

    /// Append a query parameter.
    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Set the fragment (in-page anchor).
    pub fn set_fragment(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the target is site-relative rather than absolute.
    pub fn is_site_relative(&self) -> bool {
        self.path.starts_with('/')
    }

    /// Serialize path, query string and fragment.
    pub fn render(&self) -> String {
        let mut out = self.path.clone();
        if !self.params.is_empty() {
            let query: String = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            out.push(if self.path.contains('?') { '&' } else { '?' });
            out.push_str(&query);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_path_renders_unchanged() {
        assert_eq!(PageUrl::new("/top").render(), "/top");
    }

    #[test]
    fn params_are_encoded_in_insertion_order() {
        let mut url = PageUrl::new("/search");
        url.add_param("q", "a b&c").add_param("page", "2");
        assert_eq!(url.render(), "/search?q=a+b%26c&page=2");
    }

    #[test]
    fn fragment_follows_query() {
        let mut url = PageUrl::new("/doc");
        url.add_param("v", "3");
        url.set_fragment("section2");
        assert_eq!(url.render(), "/doc?v=3#section2");
    }

    #[test]
    fn site_relative_detection() {
        assert!(PageUrl::new("/foo").is_site_relative());
        assert!(!PageUrl::new("https://other/x").is_site_relative());
    }
}
