use anyhow::Result;
use std::collections::BTreeMap;

use graph::{Args, Value};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Got {prediction} predictions for {truth} truth values")]
    Misaligned { prediction: usize, truth: usize },
    #[error("Cannot score a classifier with no samples")]
    NoSamples,
}

/// Count how each prediction lines up with its truth value,
/// treating `positive` as the positive label.
pub fn confusion_count(
    prediction: &[i64],
    truth: &[i64],
    positive: i64,
) -> Result<BTreeMap<String, i64>> {
    if prediction.len() != truth.len() {
        return Err(Error::Misaligned {
            prediction: prediction.len(),
            truth: truth.len(),
        }
        .into());
    }
    let (mut tp, mut tn, mut fp, mut fn_) = (0, 0, 0, 0);
    for (p, t) in prediction.iter().zip(truth) {
        match (*p == positive, *t == positive) {
            (true, true) => tp += 1,
            (false, false) => tn += 1,
            (true, false) => fp += 1,
            (false, true) => fn_ += 1,
        }
    }
    Ok([("tp", tp), ("tn", tn), ("fp", fp), ("fn", fn_)]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect())
}

/// Dot product of `counts` and `weights` over the keys they share,
/// normalized by the total count. A key missing from either side contributes nothing.
pub fn classifier_score(
    counts: &BTreeMap<String, Value>,
    weights: &BTreeMap<String, Value>,
) -> Result<f64> {
    let total: f64 = counts.values().filter_map(Value::as_f64).sum();
    if total == 0.0 {
        return Err(Error::NoSamples.into());
    }
    let dot: f64 = counts
        .iter()
        .filter_map(|(k, c)| Some(c.as_f64()? * weights.get(k)?.as_f64()?))
        .sum();
    Ok(dot / total)
}

/// 1 where the score reaches `threshold`, else 0.
pub fn prediction(scores: &[f64], threshold: f64) -> Vec<i64> {
    scores.iter().map(|s| i64::from(*s >= threshold)).collect()
}

// graph adapters ///////////////////

pub(crate) fn prediction_node(args: &Args) -> Result<Value> {
    let scores = args.nums("predict_proba")?;
    Ok(prediction(&scores, args.num("threshold")?).into())
}

pub(crate) fn confusion_count_node(args: &Args) -> Result<Value> {
    let counts = confusion_count(
        &args.ints("prediction")?,
        &args.ints("truth")?,
        args.int("positive")?,
    )?;
    Ok(counts.into_iter().collect())
}

pub(crate) fn classifier_score_node(args: &Args) -> Result<Value> {
    let score = classifier_score(args.map("confusion_count")?, args.map("confusion_value")?)?;
    Ok(Value::Float(score))
}
