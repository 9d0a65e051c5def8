use std::sync::LazyLock;

use thiserror::Error;
use tokio::sync::OnceCell;

static ENV_VARS: LazyLock<OnceCell<Env>> = LazyLock::new(OnceCell::new);
pub async fn get_var(var: Var) -> EnvResult<&'static str> {
    let vars = ENV_VARS.get_or_try_init(|| async { Env::new() }).await?;
    Ok(match var {
        Var::DatabaseUrl => &vars.database_url,
        Var::RedisUrl => &vars.redis_url,
        Var::ServerApiPort => &vars.server_api_port,
        Var::AuthSessionUrl => &vars.auth_session_url,
        Var::CorsAllowOrigins => &vars.cors_allow_origins,
    })
}

#[derive(Debug, Clone)]
pub struct Env {
    pub database_url: String,
    pub redis_url: String,
    pub server_api_port: String,
    pub auth_session_url: String,
    pub cors_allow_origins: String,
}

impl Env {
    pub fn new() -> EnvResult<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            server_api_port: required("SERVER_API_PORT")?,
            auth_session_url: required("AUTH_SESSION_URL")?,
            cors_allow_origins: std::env::var("CORS_ALLOW_ORIGINS")
                .unwrap_or_else(|_| String::from("*")),
        })
    }
}

fn required(name: &'static str) -> EnvResult<String> {
    std::env::var(name).map_err(|_| EnvErr::Missing(name))
}

#[derive(Debug)]
pub enum Var {
    DatabaseUrl,
    RedisUrl,
    ServerApiPort,
    AuthSessionUrl,
    CorsAllowOrigins,
}

#[macro_export]
macro_rules! var {
    ($ev:expr) => {
        $crate::util::env::get_var($ev)
    };
}

pub type EnvResult<T> = core::result::Result<T, EnvErr>;

#[derive(Debug, Error)]
pub enum EnvErr {
    #[error("missing environment variable '{0}'")]
    Missing(&'static str),
}
