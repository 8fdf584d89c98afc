//! Cohort core library.
//!
//! Plants communities in stochastic block model graphs, recovers them with
//! spectral partitioning and scores the recovery against the planted truth.
//! Graphs can be shrunk first by random edge contraction or by effective
//! resistance sparsification to measure how much structure survives.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod contraction;
mod error;
mod experiment;
mod generate;
mod graph;
mod linalg;
mod rng;
mod score;
mod sparsify;
mod spectral;

#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::ExperimentBuilder,
    contraction::{ContractionError, ContractionErrorCode, IdentityMap, contract, reconstruct},
    error::{CohortError, CohortErrorCode, Result},
    experiment::{
        ContractionBudget, Experiment, ExperimentSummary, Transform, TrialOutcome,
    },
    generate::{GenerateError, GenerateErrorCode, PlantedGraph, generate, planted_clusters},
    graph::{Cluster, Edge, Graph, GraphError, GraphErrorCode, NodeId},
    linalg::LinalgError,
    score::{Alignment, Match, ScoreError, ScoreErrorCode, align, score},
    sparsify::{
        SparsificationReport, SparsifyError, SparsifyErrorCode, SpectralSparsifier, sparsify,
    },
    spectral::{
        Linkage, PartitionError, PartitionErrorCode, SpectralPartitioner, SpectralPartitions,
        Strategy, partition,
    },
};
