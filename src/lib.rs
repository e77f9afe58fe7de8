//! Fuzzy MCDM - Multi-Criteria Decision Engine
//!
//! This crate implements the computational core of a group decision support
//! system: criteria weighting from pairwise expert judgments (Fuzzy AHP),
//! alternative ranking under interval-valued performance ratings
//! (Interval TOPSIS), and sensitivity/robustness analysis of the resulting
//! rankings under weight uncertainty.

pub mod domain;
