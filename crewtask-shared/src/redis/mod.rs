/// Redis integration for crewtask
///
/// Redis backs the session store: sessions are plain keys with a TTL, so
/// they survive API restarts and expire without any sweeper process.
///
/// # Example
///
/// ```no_run
/// use crewtask_shared::redis::client::{RedisClient, RedisConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = RedisConfig::from_env()?;
/// let client = RedisClient::new(config).await?;
///
/// let healthy = client.ping().await?;
/// println!("Redis healthy: {}", healthy);
/// # Ok(())
/// # }
/// ```

pub mod client;

pub use client::{RedisClient, RedisClientError, RedisConfig, RedisStats};
