pub mod mariadb;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlserver;
