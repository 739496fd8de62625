//! Capability traits: the seams where `rating-core` depends on something
//! it cannot itself provide (embeddings, entity extraction, scene
//! classification, LLM rewriting) without doing any I/O or pulling in an
//! async runtime. Concrete, I/O-backed implementations live in
//! `rating-server`; core only ever sees these trait objects.

use crate::error::Result;

/// Produces a fixed-size embedding for a piece of text and compares two
/// embeddings by cosine similarity. Implementations may call out to an
/// embedding service; the trait itself is synchronous so core stays free
/// of any async runtime dependency.
pub trait Embedder: Send + Sync {
    fn encode(&self, text: &str) -> Vec<f32>;
}

/// Cosine similarity between two equal-length vectors, `0.0` if either is
/// a zero vector.
pub fn cos_sim(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// An embedder that always returns an empty vector and treats every pair
/// as maximally dissimilar — used where no real embedding backend is
/// configured so callers degrade to keyword-only behavior instead of
/// panicking.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEmbedder;

impl Embedder for NullEmbedder {
    fn encode(&self, _text: &str) -> Vec<f32> {
        Vec::new()
    }
}

/// A named entity pulled out of scene text (character name, location, or
/// prop/object), with the byte offset it was found at.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub text: String,
    pub kind: EntityKind,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Character,
    Location,
    Object,
}

/// Extracts entities mentioned in scene text. The regex-based fallback
/// lives in `rating-server`; core only declares the seam.
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Vec<Entity>>;
}

/// Coarse scene-type classification used by the advisor and what-if
/// engine to phrase recommendations appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneType {
    Action,
    Dialogue,
    Violence,
    Intimate,
    Exposition,
    /// No embedding capability was available to classify the scene.
    Unknown,
}

/// Classifies a scene's dominant type, typically via embedding similarity
/// against a small set of curated example sentences per type.
pub trait SceneClassifier: Send + Sync {
    fn classify(&self, text: &str) -> SceneType;
}

/// Rewrites scene text to satisfy a natural-language instruction (e.g.
/// "soften the violence, keep the outcome"). Backed by an LLM in
/// practice; core only sees this narrow surface.
pub trait Rewriter: Send + Sync {
    fn rewrite(&self, scene_text: &str, instructions: &str) -> Result<String>;
}
