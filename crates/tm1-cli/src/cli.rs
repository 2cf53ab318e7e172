//! CLI argument parsing and configuration types

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tm1_http::{Auth, RestClientConfig};

/// Main CLI application structure
#[derive(Parser, Debug)]
#[command(
    name = "tm1-elements",
    version,
    about = "Inspect dimension elements, attributes and hierarchies on a TM1 server",
    long_about = "Read-side access to the element metadata of a TM1 server through its REST API.\n\
                  Lists elements, counts, types and levels, resolves attribute values and aliases,\n\
                  walks consolidations and executes MDX set expressions.\n\n\
                  Credentials are taken from --user/--password/--namespace or --token, or from\n\
                  TM1_USER, TM1_PASSWORD, TM1_NAMESPACE and TM1_TOKEN."
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub conn: Connection,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List element names
    Elements {
        #[command(flatten)]
        target: Target,

        /// Only leaf (non-consolidated) elements
        #[arg(long)]
        leaves: bool,
    },

    /// Count elements
    Count {
        #[command(flatten)]
        target: Target,

        /// Which elements to count
        #[arg(long, value_enum, default_value = "all")]
        kind: CountKind,
    },

    /// Show the type of every element
    Types {
        #[command(flatten)]
        target: Target,

        /// Leave consolidated elements out
        #[arg(long)]
        skip_consolidations: bool,
    },

    /// List level names, deepest first unless --ascending
    Levels {
        #[command(flatten)]
        target: Target,

        /// Top level first
        #[arg(long)]
        ascending: bool,
    },

    /// List attribute definitions
    Attributes {
        #[command(flatten)]
        target: Target,

        /// Only alias attributes
        #[arg(long)]
        aliases: bool,
    },

    /// Show the value of one attribute per element
    Attribute {
        #[command(flatten)]
        target: Target,

        /// Attribute name
        attribute: String,

        /// Elements to read (defaults to every element)
        #[arg(long, short = 'e', conflicts_with = "mdx")]
        elements: Vec<String>,

        /// MDX set expression selecting the elements
        #[arg(long)]
        mdx: Option<String>,

        /// Keep elements whose value is empty
        #[arg(long)]
        include_empty: bool,
    },

    /// List the members under a consolidation
    Members {
        #[command(flatten)]
        target: Target,

        /// Consolidated element
        consolidation: String,

        /// Only leaf members
        #[arg(long)]
        leaves: bool,

        /// Levels of components to expand (default 99)
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// List elements whose attribute equals a value
    Filter {
        #[command(flatten)]
        target: Target,

        /// Attribute name
        attribute: String,

        /// Value to compare against
        value: String,

        /// Compare as a number instead of a string; NaN and infinities are rejected
        #[arg(long)]
        numeric: bool,
    },

    /// Check whether an element exists
    Exists {
        #[command(flatten)]
        target: Target,

        /// Element name
        element: String,
    },

    /// Execute an MDX set expression and show its tuples
    SetMdx {
        /// MDX set expression
        mdx: String,

        /// Maximum number of tuples
        #[arg(long)]
        top: Option<usize>,
    },
}

/// Dimension and hierarchy addressed by a command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Dimension name
    pub dimension: String,

    /// Hierarchy name (defaults to the dimension name)
    #[arg(long = "hierarchy", short = 'H')]
    pub hierarchy: Option<String>,
}

impl Target {
    /// The hierarchy name, falling back to the same-named hierarchy
    pub fn hierarchy(&self) -> &str {
        self.hierarchy.as_deref().unwrap_or(&self.dimension)
    }
}

/// Connection configuration
#[derive(Args, Debug, Clone)]
pub struct Connection {
    /// Server URL without the API root
    #[arg(
        long,
        global = true,
        env = "TM1_BASE_URL",
        default_value = "http://localhost:8010"
    )]
    pub url: String,

    /// User name
    #[arg(long, global = true, env = "TM1_USER")]
    pub user: Option<String>,

    /// Password
    #[arg(long, global = true, env = "TM1_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// CAM namespace (switches to CAM authentication)
    #[arg(long, global = true, env = "TM1_NAMESPACE")]
    pub namespace: Option<String>,

    /// Bearer token (takes precedence over user and password)
    #[arg(long, global = true, env = "TM1_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "TM1_TIMEOUT_SECS")]
    pub timeout: Option<u64>,
}

impl Connection {
    /// Credentials for the configured authentication mode
    pub fn auth(&self) -> Auth {
        if let Some(token) = &self.token {
            return Auth::Bearer(token.clone());
        }
        let Some(user) = &self.user else {
            return Auth::None;
        };
        let password = self.password.clone().unwrap_or_default();
        match &self.namespace {
            Some(namespace) if !namespace.is_empty() => Auth::Cam {
                user: user.clone(),
                password,
                namespace: namespace.clone(),
            },
            _ => Auth::Basic {
                user: user.clone(),
                password,
            },
        }
    }

    /// Transport configuration for this connection
    pub fn config(&self) -> RestClientConfig {
        let mut config = RestClientConfig::default()
            .with_base_url(&self.url)
            .with_auth(self.auth());
        if let Some(seconds) = self.timeout {
            config.timeout.request = Some(Duration::from_secs(seconds));
        }
        config
    }
}

/// Element subsets for `count`
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CountKind {
    /// Every element
    All,
    /// Leaf elements
    Leaves,
    /// Consolidated elements
    Consolidated,
}

/// Output formats
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable with colors
    Human,
    /// JSON output
    Json,
    /// Table format
    Table,
}
