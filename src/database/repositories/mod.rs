// 存储库模块
// 基于 Postgres 的持久层实现

pub mod access;
