use clap::Parser;
use reqwest::Url;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(short, long, env = "BIND", default_value = "127.0.0.1")]
    pub bind: String,

    #[arg(short, long, env = "PORT", default_value = "3001")]
    pub port: u16,

    #[arg(
        short,
        long,
        env = "SOLANA_RPC_URL",
        help = "Solana JSON-RPC endpoint. Required."
    )]
    pub rpc_url: Option<Url>,

    #[arg(long, env = "SOLANA_COMMITMENT", default_value = "confirmed")]
    pub commitment: String,

    #[arg(
        long,
        env = "RPC_TIMEOUT",
        help = "Upstream request timeout in seconds. Unset means the http client default."
    )]
    pub rpc_timeout: Option<u64>,

    #[arg(
        short,
        long,
        env = "CACHE_TYPE",
        default_value = "lru",
        help = "Cache backend: memory, lru or redis."
    )]
    pub cache_type: String,

    #[arg(
        long,
        env = "CACHE_TTL",
        default_value = "300",
        help = "Default cache entry time to live, in seconds."
    )]
    pub cache_ttl: u64,

    #[arg(long, env = "MAX_CACHE_SIZE", default_value = "1000")]
    pub max_cache_size: usize,

    #[arg(long, env = "REDIS_URL", help = "Redis URL. Required when cache type is redis.")]
    pub redis_url: Option<String>,

    #[arg(long, env = "METRICS_PREFIX", default_value = "cached_solana_rpc")]
    pub metrics_prefix: String,

    #[arg(
        long,
        env = "CORS_ORIGIN",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://127.0.0.1:3000",
        help = "Comma separated origins allowed to call the api from a browser."
    )]
    pub cors_origins: Vec<Url>,
}
