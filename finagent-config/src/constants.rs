/// Environment variable names read by the loader
pub mod env {
    pub const FINANCE_MCP_URL: &str = "FINANCE_MCP_URL";
    pub const AUTH_SERVER_TOKEN_URL: &str = "AUTH_SERVER_TOKEN_URL";
    pub const MCP_CLIENT_ID: &str = "MCP_CLIENT_ID";
    pub const MCP_CLIENT_SECRET: &str = "MCP_CLIENT_SECRET";
    pub const MCP_TOKEN_SCOPE: &str = "MCP_TOKEN_SCOPE";
    pub const SECRET_NAME: &str = "SECRET_NAME";
    pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
    pub const BEDROCK_MODEL_ID: &str = "BEDROCK_MODEL_ID";
    pub const AGENT_WORKSPACE: &str = "AGENT_WORKSPACE";
    pub const AGENT_MAX_TURNS: &str = "AGENT_MAX_TURNS";
    pub const AGENT_BIND_ADDR: &str = "AGENT_BIND_ADDR";
}

/// Default values applied when an optional setting is absent
pub mod defaults {
    /// Claude Sonnet 4.5 through the Bedrock US cross-region inference profile
    pub const MODEL_ID: &str = "us.anthropic.claude-sonnet-4-5-20250929-v1:0";
    pub const FINANCE_MCP_URL: &str = "https://finance.macrospire.com/mcp";
    pub const AWS_REGION: &str = "us-east-1";
    pub const TOKEN_SCOPE: &str = "mcp:read mcp:write mcp:tools";
    pub const WORKSPACE: &str = ".";
    pub const MAX_AGENT_TURNS: usize = 16;
    pub const BIND_ADDR: &str = "0.0.0.0:8080";
    pub const PROMPT: &str = "Hello! How can I help you today?";
}

/// OAuth2 client-credentials constants
pub mod auth {
    pub const GRANT_TYPE: &str = "client_credentials";
    /// Cached tokens are treated as expired this many seconds early
    pub const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;
    /// Lifetime assumed when the token endpoint omits `expires_in`
    pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
}

/// Keys expected inside the Secrets Manager JSON document
pub mod secrets {
    pub const CLIENT_ID_KEY: &str = "MCP_CLIENT_ID";
    pub const CLIENT_SECRET_KEY: &str = "MCP_CLIENT_SECRET";
}
