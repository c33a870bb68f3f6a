//! Integration tests that need a real Postgres; they run against a throwaway container.
