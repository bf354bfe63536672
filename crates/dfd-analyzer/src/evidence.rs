//! Evidence synthesis.
//!
//! Produces human-readable abnormality findings and technique attributions
//! for a manipulated verdict. Content is drawn at random from the closed
//! catalogs; only the counts depend on the verdict's confidence. The random
//! source is a parameter so callers can seed it.

use rand::seq::{index, SliceRandom};
use rand::Rng;

use dfd_models::{
    AbnormalityCategory, AbnormalityFinding, AnalysisVerdict, Technique, TechniqueAttribution,
};

/// Timeframes attached to each abnormality, at most.
pub const MAX_TIMEFRAMES_PER_FINDING: usize = 3;

/// Synthesized evidence for one verdict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
    pub abnormalities: Vec<AbnormalityFinding>,
    /// Sorted by probability, highest first
    pub techniques: Vec<TechniqueAttribution>,
}

impl Evidence {
    pub fn is_empty(&self) -> bool {
        self.abnormalities.is_empty() && self.techniques.is_empty()
    }
}

/// `clamp(floor(confidence * 7), 2, 5)`
pub fn abnormality_count(confidence: f64) -> usize {
    ((confidence * 7.0).floor() as i64).clamp(2, 5) as usize
}

/// `clamp(floor(confidence * 5), 1, 3)`
pub fn technique_count(confidence: f64) -> usize {
    ((confidence * 5.0).floor() as i64).clamp(1, 3) as usize
}

/// Build evidence for `verdict`. A non-manipulated verdict gets none.
pub fn synthesize<R: Rng + ?Sized>(verdict: &AnalysisVerdict, rng: &mut R) -> Evidence {
    if !verdict.is_manipulated {
        return Evidence::default();
    }

    Evidence {
        abnormalities: pick_abnormalities(
            abnormality_count(verdict.confidence),
            &verdict.suspicious_timestamps_seconds,
            rng,
        ),
        techniques: pick_techniques(technique_count(verdict.confidence), rng),
    }
}

fn pick_abnormalities<R: Rng + ?Sized>(
    count: usize,
    suspicious: &[u64],
    rng: &mut R,
) -> Vec<AbnormalityFinding> {
    let mut categories = AbnormalityCategory::ALL;
    categories.shuffle(rng);

    categories
        .iter()
        .take(count)
        .map(|&category| {
            let description = pick_description(category.descriptions(), rng);
            let confidence = 0.70 + 0.25 * rng.random::<f64>();
            let timeframes_seconds = sample_timeframes(suspicious, rng);
            AbnormalityFinding {
                category,
                description,
                confidence,
                timeframes_seconds,
            }
        })
        .collect()
}

fn pick_techniques<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<TechniqueAttribution> {
    let mut catalog = Technique::ALL;
    catalog.shuffle(rng);

    let mut techniques: Vec<TechniqueAttribution> = catalog
        .iter()
        .take(count)
        .map(|&name| TechniqueAttribution {
            name,
            description: pick_description(name.descriptions(), rng),
            probability: 0.60 + 0.35 * rng.random::<f64>(),
        })
        .collect();

    sort_by_probability(&mut techniques);
    techniques
}

/// Highest probability first; equal probabilities keep their order.
pub fn sort_by_probability(techniques: &mut [TechniqueAttribution]) {
    techniques.sort_by(|a, b| b.probability.total_cmp(&a.probability));
}

fn pick_description<R: Rng + ?Sized>(candidates: &[&str], rng: &mut R) -> String {
    candidates
        .get(rng.random_range(0..candidates.len().max(1)))
        .map(|d| d.to_string())
        .unwrap_or_default()
}

/// Up to three entries of `suspicious`, drawn at distinct positions.
fn sample_timeframes<R: Rng + ?Sized>(suspicious: &[u64], rng: &mut R) -> Vec<u64> {
    if suspicious.is_empty() {
        return Vec::new();
    }
    let amount = suspicious.len().min(MAX_TIMEFRAMES_PER_FINDING);
    index::sample(rng, suspicious.len(), amount)
        .iter()
        .map(|i| suspicious[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn verdict(confidence: f64, timestamps: Vec<u64>) -> AnalysisVerdict {
        AnalysisVerdict::from_confidence(confidence, timestamps)
    }

    #[test]
    fn test_abnormality_count() {
        assert_eq!(abnormality_count(0.5), 3);
        assert_eq!(abnormality_count(0.1), 2);
        assert_eq!(abnormality_count(1.0), 5);
        assert_eq!(abnormality_count(0.72), 5);
        assert_eq!(abnormality_count(0.58), 4);
    }

    #[test]
    fn test_technique_count() {
        assert_eq!(technique_count(0.9), 3);
        assert_eq!(technique_count(0.1), 1);
        assert_eq!(technique_count(0.55), 2);
        assert_eq!(technique_count(0.7), 3);
    }

    #[test]
    fn test_negative_verdict_has_no_evidence() {
        let mut rng = StdRng::seed_from_u64(1);
        let evidence = synthesize(&verdict(0.3, vec![]), &mut rng);
        assert!(evidence.is_empty());
    }

    #[test]
    fn test_counts_follow_confidence() {
        let mut rng = StdRng::seed_from_u64(7);
        let evidence = synthesize(&verdict(0.82, vec![3, 4]), &mut rng);
        assert_eq!(evidence.abnormalities.len(), 5);
        assert_eq!(evidence.techniques.len(), 3);

        let evidence = synthesize(&verdict(0.55, vec![]), &mut rng);
        assert_eq!(evidence.abnormalities.len(), 3);
        assert_eq!(evidence.techniques.len(), 2);
    }

    #[test]
    fn test_evidence_bounds_hold_across_seeds() {
        let timestamps = vec![1, 1, 4, 9, 12];
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let confidence = 0.51 + (seed as f64 / 200.0) * 0.49;
            let evidence = synthesize(&verdict(confidence, timestamps.clone()), &mut rng);

            let categories: HashSet<_> = evidence.abnormalities.iter().map(|a| a.category).collect();
            assert_eq!(categories.len(), evidence.abnormalities.len(), "categories repeat");

            for finding in &evidence.abnormalities {
                assert!((0.70..=0.95).contains(&finding.confidence));
                assert!(finding.category.descriptions().contains(&finding.description.as_str()));
                assert_eq!(finding.timeframes_seconds.len(), 3);
                assert!(finding.timeframes_seconds.iter().all(|t| timestamps.contains(t)));
            }

            let names: HashSet<_> = evidence.techniques.iter().map(|t| t.name).collect();
            assert_eq!(names.len(), evidence.techniques.len(), "techniques repeat");

            for technique in &evidence.techniques {
                assert!((0.60..=0.95).contains(&technique.probability));
                assert!(technique.name.descriptions().contains(&technique.description.as_str()));
            }
            assert!(evidence
                .techniques
                .windows(2)
                .all(|w| w[0].probability >= w[1].probability));
        }
    }

    #[test]
    fn test_few_timestamps_are_all_used() {
        let mut rng = StdRng::seed_from_u64(3);
        let evidence = synthesize(&verdict(0.9, vec![6, 2]), &mut rng);
        for finding in &evidence.abnormalities {
            let mut got = finding.timeframes_seconds.clone();
            got.sort_unstable();
            assert_eq!(got, vec![2, 6]);
        }
    }

    #[test]
    fn test_no_timestamps_no_timeframes() {
        let mut rng = StdRng::seed_from_u64(11);
        let evidence = synthesize(&verdict(0.6, vec![]), &mut rng);
        assert!(evidence
            .abnormalities
            .iter()
            .all(|a| a.timeframes_seconds.is_empty()));
    }

    #[test]
    fn test_same_seed_same_evidence() {
        let v = verdict(0.77, vec![1, 2, 3, 4]);
        let a = synthesize(&v, &mut StdRng::seed_from_u64(42));
        let b = synthesize(&v, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sort_descending_and_stable() {
        let attribution = |name, probability| TechniqueAttribution {
            name,
            description: String::new(),
            probability,
        };
        let mut techniques = vec![
            attribution(Technique::Gan, 0.65),
            attribution(Technique::Diffusion, 0.91),
            attribution(Technique::FaceSwap, 0.78),
        ];
        sort_by_probability(&mut techniques);
        let order: Vec<f64> = techniques.iter().map(|t| t.probability).collect();
        assert_eq!(order, vec![0.91, 0.78, 0.65]);

        let mut ties = vec![
            attribution(Technique::Autoencoder, 0.7),
            attribution(Technique::NeuralRendering, 0.7),
        ];
        sort_by_probability(&mut ties);
        assert_eq!(ties[0].name, Technique::Autoencoder);
    }
}
