// SPDX-License-Identifier: MIT

//! A representative subset of the Redis command surface, built as thin
//! argument-building wrappers over [`Connection::call`] /
//! [`Connection::subscribe`]. None of this is required to drive the
//! connection/pool/router core; it exists so callers don't have to hand-roll
//! `args!["SET", key, value]` for the common cases.

use std::sync::Arc;

use bytes::Bytes;

use crate::client::connection::{Connection, SubCallback};
use crate::error::RedisCoreError;
use crate::protocol::{Argument, Reply};

/// Optional expiry/existence modifiers accepted by `SET`.
#[derive(Debug, Clone, Copy)]
pub enum SetCondition {
    /// `NX` — only set if the key does not already exist.
    IfNotExists,
    /// `XX` — only set if the key already exists.
    IfExists,
}

#[derive(Debug, Clone, Copy)]
pub enum Expiry {
    Seconds(u64),
    Millis(u64),
}

/// How `ZUNIONSTORE` combines scores for a member present in several sets.
#[derive(Debug, Clone, Copy)]
pub enum Aggregate {
    Sum,
    Min,
    Max,
}

impl Aggregate {
    fn as_arg(self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        }
    }
}

/// Command-surface wrapper around a single [`Connection`].
#[derive(Clone)]
pub struct Commands {
    conn: Arc<Connection>,
}

fn arg<A: Argument>(a: A) -> Bytes {
    a.into_arg()
}

impl Commands {
    pub fn new(conn: Arc<Connection>) -> Self {
        Commands { conn }
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.conn
    }

    async fn call(&self, args: Vec<Bytes>) -> Result<Reply, RedisCoreError> {
        self.conn.call(args).await
    }

    pub async fn ping(&self) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("PING")]).await
    }

    pub async fn echo(&self, message: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("ECHO"), arg(message)]).await
    }

    pub async fn auth(&self, password: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("AUTH"), arg(password)]).await
    }

    pub async fn select(&self, db: i64) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("SELECT"), arg(db)]).await
    }

    pub async fn quit(&self) -> Result<(), RedisCoreError> {
        self.conn.close().await
    }

    pub async fn get(&self, key: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("GET"), arg(key)]).await
    }

    pub async fn set(
        &self,
        key: &str,
        value: &str,
        expiry: Option<Expiry>,
        condition: Option<SetCondition>,
    ) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("SET"), arg(key), arg(value)];
        match expiry {
            Some(Expiry::Seconds(n)) => {
                args.push(arg("EX"));
                args.push(arg(n));
            }
            Some(Expiry::Millis(n)) => {
                args.push(arg("PX"));
                args.push(arg(n));
            }
            None => {}
        }
        match condition {
            Some(SetCondition::IfNotExists) => args.push(arg("NX")),
            Some(SetCondition::IfExists) => args.push(arg("XX")),
            None => {}
        }
        self.call(args).await
    }

    pub async fn setnx(&self, key: &str, value: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("SETNX"), arg(key), arg(value)]).await
    }

    pub async fn append(&self, key: &str, value: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("APPEND"), arg(key), arg(value)]).await
    }

    pub async fn incr(&self, key: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("INCR"), arg(key)]).await
    }

    pub async fn decr(&self, key: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("DECR"), arg(key)]).await
    }

    pub async fn mget(&self, keys: &[&str]) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("MGET")];
        args.extend(keys.iter().map(|k| arg(*k)));
        self.call(args).await
    }

    pub async fn mset(&self, pairs: &[(&str, &str)]) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("MSET")];
        for (k, v) in pairs {
            args.push(arg(*k));
            args.push(arg(*v));
        }
        self.call(args).await
    }

    pub async fn del(&self, keys: &[&str]) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("DEL")];
        args.extend(keys.iter().map(|k| arg(*k)));
        self.call(args).await
    }

    pub async fn exists(&self, keys: &[&str]) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("EXISTS")];
        args.extend(keys.iter().map(|k| arg(*k)));
        self.call(args).await
    }

    pub async fn expire(&self, key: &str, seconds: u64) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("EXPIRE"), arg(key), arg(seconds)]).await
    }

    pub async fn ttl(&self, key: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("TTL"), arg(key)]).await
    }

    pub async fn lpush(&self, key: &str, values: &[&str]) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("LPUSH"), arg(key)];
        args.extend(values.iter().map(|v| arg(*v)));
        self.call(args).await
    }

    pub async fn rpush(&self, key: &str, values: &[&str]) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("RPUSH"), arg(key)];
        args.extend(values.iter().map(|v| arg(*v)));
        self.call(args).await
    }

    pub async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("LRANGE"), arg(key), arg(start), arg(stop)])
            .await
    }

    pub async fn lpop(&self, key: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("LPOP"), arg(key)]).await
    }

    pub async fn blpop(&self, keys: &[&str], timeout_secs: u64) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("BLPOP")];
        args.extend(keys.iter().map(|k| arg(*k)));
        args.push(arg(timeout_secs));
        self.call(args).await
    }

    pub async fn hset(&self, key: &str, field: &str, value: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("HSET"), arg(key), arg(field), arg(value)])
            .await
    }

    pub async fn hget(&self, key: &str, field: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("HGET"), arg(key), arg(field)]).await
    }

    pub async fn hgetall(&self, key: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("HGETALL"), arg(key)]).await
    }

    pub async fn hmset(&self, key: &str, fields: &[(&str, &str)]) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("HMSET"), arg(key)];
        for (f, v) in fields {
            args.push(arg(*f));
            args.push(arg(*v));
        }
        self.call(args).await
    }

    pub async fn sadd(&self, key: &str, members: &[&str]) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("SADD"), arg(key)];
        args.extend(members.iter().map(|m| arg(*m)));
        self.call(args).await
    }

    pub async fn smembers(&self, key: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("SMEMBERS"), arg(key)]).await
    }

    /// `score_members` pairs are emitted in `score member` order, per ZADD's
    /// wire layout.
    pub async fn zadd(
        &self,
        key: &str,
        score_members: &[(f64, &str)],
    ) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("ZADD"), arg(key)];
        for (score, member) in score_members {
            args.push(arg(*score));
            args.push(arg(*member));
        }
        self.call(args).await
    }

    pub async fn zrange(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        with_scores: bool,
    ) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("ZRANGE"), arg(key), arg(start), arg(stop)];
        if with_scores {
            args.push(arg("WITHSCORES"));
        }
        self.call(args).await
    }

    /// `ZUNIONSTORE destination numkeys key [key ...] [WEIGHTS w [w ...]] [AGGREGATE SUM|MIN|MAX]`
    pub async fn zunionstore(
        &self,
        destination: &str,
        keys: &[&str],
        weights: Option<&[f64]>,
        aggregate: Option<Aggregate>,
    ) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("ZUNIONSTORE"), arg(destination), arg(keys.len() as i64)];
        args.extend(keys.iter().map(|k| arg(*k)));
        if let Some(weights) = weights {
            args.push(arg("WEIGHTS"));
            args.extend(weights.iter().map(|w| arg(*w)));
        }
        if let Some(aggregate) = aggregate {
            args.push(arg("AGGREGATE"));
            args.push(arg(aggregate.as_arg()));
        }
        self.call(args).await
    }

    /// `EVAL script numkeys key [key ...] arg [arg ...]`
    pub async fn eval(
        &self,
        script: &str,
        keys: &[&str],
        argv: &[&str],
    ) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("EVAL"), arg(script), arg(keys.len() as i64)];
        args.extend(keys.iter().map(|k| arg(*k)));
        args.extend(argv.iter().map(|a| arg(*a)));
        self.call(args).await
    }

    pub async fn evalsha(
        &self,
        sha1: &str,
        keys: &[&str],
        argv: &[&str],
    ) -> Result<Reply, RedisCoreError> {
        let mut args = vec![arg("EVALSHA"), arg(sha1), arg(keys.len() as i64)];
        args.extend(keys.iter().map(|k| arg(*k)));
        args.extend(argv.iter().map(|a| arg(*a)));
        self.call(args).await
    }

    pub async fn publish(&self, channel: &str, message: &str) -> Result<Reply, RedisCoreError> {
        self.call(vec![arg("PUBLISH"), arg(channel), arg(message)])
            .await
    }

    pub async fn subscribe(
        &self,
        channels: &[&str],
        callback: SubCallback,
    ) -> Result<(), RedisCoreError> {
        let channels: Vec<Bytes> = channels.iter().map(|c| arg(*c)).collect();
        self.conn.subscribe(&channels, callback).await
    }

    pub async fn psubscribe(
        &self,
        patterns: &[&str],
        callback: SubCallback,
    ) -> Result<(), RedisCoreError> {
        let patterns: Vec<Bytes> = patterns.iter().map(|p| arg(*p)).collect();
        self.conn.psubscribe(&patterns, callback).await
    }

    pub async fn unsubscribe(&self, channels: &[&str]) -> Result<(), RedisCoreError> {
        let channels: Vec<Bytes> = channels.iter().map(|c| arg(*c)).collect();
        self.conn.unsubscribe(&channels).await
    }

    pub async fn punsubscribe(&self, patterns: &[&str]) -> Result<(), RedisCoreError> {
        let patterns: Vec<Bytes> = patterns.iter().map(|p| arg(*p)).collect();
        self.conn.punsubscribe(&patterns).await
    }
}
