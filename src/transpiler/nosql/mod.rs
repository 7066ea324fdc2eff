// NoSQL transpiler modules
pub mod cassandra;
pub mod elastic;
pub mod mongo;
pub mod neo4j;
pub mod orientdb;
