//! # Collection Gate
//!
//! A collection access and ingest gateway for a digital object repository.
//!
//! Collection Gate sits in front of a repository's object store and triple
//! store and answers the questions a collection frontend asks: may this
//! caller manage, share, or ingest into a collection; which collections
//! match a piece of text; what does the manage surface for this collection
//! look like; what form must be filled to ingest a new member; how big is
//! the repository. The heavy machinery — object storage, RDF indexing, the
//! ingest pipeline, the permission engine — stays in the external systems
//! this gateway calls.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌─────────────┐
//! │  Frontend /  │──▶│  Collection Gate   │──▶│ Object store │
//! │  CLI (cgate) │   │ access · search ·  │   │  (REST API)  │
//! └──────────────┘   │ manage · ingest    │──▶│ Triple store │
//!                    └───────────────────┘   │   (SPARQL)   │
//!                                             └─────────────┘
//! ```
//!
//! Every collaborator is a trait seam ([`objects::ObjectStore`],
//! [`triplestore::TripleStore`], [`access::PermissionGate`],
//! [`ingest::IngestResolver`], [`ingest::FormBuilder`]) with a default
//! implementation wired by [`server::run_server`]; embedding deployments
//! build an [`server::AppState`] with their own.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`objects`] | Object loader seam (REST + in-memory) |
//! | [`triplestore`] | SPARQL query seam |
//! | [`access`] | Access decisions and the permission gate |
//! | [`search`] | Filtered collection search |
//! | [`manage`] | Manage-surface plugin registry |
//! | [`ingest`] | Ingest configuration and form assembly |
//! | [`stats`] | Object and collection counts |
//! | [`server`] | HTTP API |

pub mod access;
pub mod config;
pub mod ingest;
pub mod manage;
pub mod models;
pub mod objects;
pub mod search;
pub mod server;
pub mod stats;
pub mod triplestore;
