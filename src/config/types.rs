use serde::Deserialize;

/// User agent sent when a request does not name one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for the CLI host
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub request: CrawlRequest,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub render: RenderConfig,

    /// Upper bound on the wall-clock time of a whole crawl (seconds)
    #[serde(rename = "crawl-timeout-secs")]
    pub crawl_timeout_secs: Option<u64>,
}

/// A single crawl: where to start, what the items are, and what to pull from each
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrawlRequest {
    /// URL of the list page
    pub url: String,

    /// Selector matching one element per output record
    #[serde(rename = "list-selector")]
    pub list_selector: String,

    /// Top-level fields, in output order
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldSpec>,

    /// Raw cookie string in `name=value; name=value` form
    #[serde(default)]
    pub cookie: Option<String>,

    #[serde(default = "default_user_agent", rename = "user-agent")]
    pub user_agent: String,

    /// Cap on the number of list items processed
    #[serde(default, rename = "max-items")]
    pub max_items: Option<usize>,

    /// Fetch documents through the browser backend instead of a plain GET
    #[serde(default, rename = "rendered")]
    pub use_rendered_fetch: bool,

    /// Rendered mode: selector to wait for on the list page
    #[serde(default, rename = "wait-selector")]
    pub wait_selector: Option<String>,

    /// Rendered mode: element to click on the list page before capture
    #[serde(default, rename = "click-selector")]
    pub click_selector: Option<String>,

    /// Treat a configured but unmatched click selector as "no link"
    #[serde(default, rename = "strict-click-selector")]
    pub strict_click_selector: bool,
}

/// One output field: a name, the selector locating its element, and how to read it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub selector: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// How a field produces its value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldKind {
    /// Normalized text content of the element
    Text,

    /// Inner markup of the element
    Markup,

    /// Value of a named attribute
    Attribute {
        #[serde(rename = "attribute")]
        name: String,
    },

    /// Follow a link to another document and extract there
    Navigate(NavigationSpec),
}

/// Where a navigation field goes next and what it extracts once there
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NavigationSpec {
    #[serde(default, rename = "click-selector")]
    pub click_selector: String,

    /// Subtree of the linked document to extract from (whole document when absent)
    #[serde(default, rename = "target-selector")]
    pub target_selector: Option<String>,

    /// Fields extracted from the target subtree
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldSpec>,

    /// Template turning an opaque identifier into a URL; `{id}` is replaced
    #[serde(default, rename = "url-template")]
    pub url_template: Option<String>,

    /// Rendered mode: selector to wait for on the linked document
    #[serde(default, rename = "wait-selector")]
    pub wait_selector: Option<String>,
}

/// Static HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs", rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs", rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

/// WebDriver backend configuration for rendered fetches
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_webdriver_url", rename = "webdriver-url")]
    pub webdriver_url: String,

    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default = "default_timeout_secs", rename = "page-load-timeout-secs")]
    pub page_load_timeout_secs: u64,

    #[serde(default = "default_wait_timeout_secs", rename = "wait-timeout-secs")]
    pub wait_timeout_secs: u64,

    #[serde(default = "default_click_wait_timeout_secs", rename = "click-wait-timeout-secs")]
    pub click_wait_timeout_secs: u64,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_wait_timeout_secs() -> u64 {
    10
}

fn default_click_wait_timeout_secs() -> u64 {
    5
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            page_load_timeout_secs: default_timeout_secs(),
            wait_timeout_secs: default_wait_timeout_secs(),
            click_wait_timeout_secs: default_click_wait_timeout_secs(),
        }
    }
}

impl CrawlRequest {
    /// Create a request with default options and no fields
    pub fn new(url: impl Into<String>, list_selector: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            list_selector: list_selector.into(),
            fields: Vec::new(),
            cookie: None,
            user_agent: default_user_agent(),
            max_items: None,
            use_rendered_fetch: false,
            wait_selector: None,
            click_selector: None,
            strict_click_selector: false,
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn with_rendered_fetch(mut self, rendered: bool) -> Self {
        self.use_rendered_fetch = rendered;
        self
    }

    pub fn with_strict_click_selector(mut self, strict: bool) -> Self {
        self.strict_click_selector = strict;
        self
    }
}

impl FieldSpec {
    pub fn text(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            kind: FieldKind::Text,
        }
    }

    pub fn markup(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            kind: FieldKind::Markup,
        }
    }

    pub fn attribute(
        name: impl Into<String>,
        selector: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            kind: FieldKind::Attribute {
                name: attribute.into(),
            },
        }
    }

    pub fn navigate(
        name: impl Into<String>,
        selector: impl Into<String>,
        navigation: NavigationSpec,
    ) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            kind: FieldKind::Navigate(navigation),
        }
    }

    /// Navigation settings, if this is a navigation field
    pub fn navigation(&self) -> Option<&NavigationSpec> {
        match &self.kind {
            FieldKind::Navigate(navigation) => Some(navigation),
            _ => None,
        }
    }
}

impl NavigationSpec {
    pub fn new(click_selector: impl Into<String>) -> Self {
        Self {
            click_selector: click_selector.into(),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target_selector: impl Into<String>) -> Self {
        self.target_selector = Some(target_selector.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_url_template(mut self, url_template: impl Into<String>) -> Self {
        self.url_template = Some(url_template.into());
        self
    }

    pub fn with_wait_selector(mut self, wait_selector: impl Into<String>) -> Self {
        self.wait_selector = Some(wait_selector.into());
        self
    }
}
