use std::fmt::{Display, Formatter, Result as FmtResult};

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client as RedisClient};

pub const COMPARE_CAP: usize = 3;

#[derive(Debug)]
pub struct CompareError {
    pub message: String,
}

impl Display for CompareError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.message)
    }
}

pub fn apply_add(current: &[i32], property_id: i32, cap: usize) -> Result<Vec<i32>, CompareError> {
    if current.contains(&property_id) {
        return Ok(current.to_vec());
    }

    if current.len() >= cap {
        return Err(CompareError {
            message: format!("Compare list is full, maximum {} properties", cap),
        });
    }

    let mut next = current.to_vec();
    next.push(property_id);
    Ok(next)
}

pub fn apply_remove(current: &[i32], property_id: i32) -> Vec<i32> {
    current
        .iter()
        .copied()
        .filter(|id| *id != property_id)
        .collect::<Vec<_>>()
}

pub struct Compare {
    redis: RedisClient,
}

impl Compare {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    fn key(visitor_id: &str) -> String {
        format!("compare:{}", visitor_id)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CompareError> {
        self.redis
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|error| CompareError {
                message: format!("Fail to connect redis: {}", error),
            })
    }

    pub async fn selection(&self, visitor_id: &str) -> Result<Vec<i32>, CompareError> {
        let mut conn = self.connection().await?;

        conn.lrange::<_, Vec<i32>>(Self::key(visitor_id), 0, -1)
            .await
            .map_err(|error| CompareError {
                message: format!("Fail to read compare list: {}", error),
            })
    }

    pub async fn add(&self, visitor_id: &str, property_id: i32) -> Result<Vec<i32>, CompareError> {
        let mut conn = self.connection().await?;

        let current = conn
            .lrange::<_, Vec<i32>>(Self::key(visitor_id), 0, -1)
            .await
            .map_err(|error| CompareError {
                message: format!("Fail to read compare list: {}", error),
            })?;
        let next = apply_add(&current, property_id, COMPARE_CAP)?;

        self.rewrite(&mut conn, visitor_id, &next).await?;
        Ok(next)
    }

    pub async fn remove(
        &self,
        visitor_id: &str,
        property_id: i32,
    ) -> Result<Vec<i32>, CompareError> {
        let mut conn = self.connection().await?;

        let current = conn
            .lrange::<_, Vec<i32>>(Self::key(visitor_id), 0, -1)
            .await
            .map_err(|error| CompareError {
                message: format!("Fail to read compare list: {}", error),
            })?;
        let next = apply_remove(&current, property_id);

        self.rewrite(&mut conn, visitor_id, &next).await?;
        Ok(next)
    }

    // @NOTE: the whole list is rewritten on every mutation, the cap
    //        keeps it at three entries
    async fn rewrite(
        &self,
        conn: &mut MultiplexedConnection,
        visitor_id: &str,
        next: &[i32],
    ) -> Result<(), CompareError> {
        let key = Self::key(visitor_id);

        conn.del::<_, ()>(&key).await.map_err(|error| CompareError {
            message: format!("Fail to rewrite compare list: {}", error),
        })?;

        if !next.is_empty() {
            conn.rpush::<_, _, ()>(&key, next)
                .await
                .map_err(|error| CompareError {
                    message: format!("Fail to rewrite compare list: {}", error),
                })?;
        }

        Ok(())
    }
}
