//! Isolation Forest
//!
//! 分離の容易さで外れ値をスコアリングするアンサンブル検知器

use super::types::validate_contamination;
use crate::error::Result;
use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// 外れ値検知ストラテジー
///
/// Fits a fresh model on `matrix` (rows are points, columns are features)
/// and returns one outlier flag per row.
pub trait OutlierStrategy: Send + Sync {
    fn fit_flag(&self, matrix: ArrayView2<f64>) -> Result<Vec<bool>>;

    /// ストラテジー名（ログ用）
    fn name(&self) -> &'static str;
}

/// Isolation Forest
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForest {
    /// 木の本数
    n_estimators: usize,
    /// 1本あたりの最大サンプル数
    max_samples: usize,
    /// 想定外れ値比率
    contamination: f64,
    /// 乱数シード
    random_state: u64,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.05,
            random_state: 42,
        }
    }
}

impl IsolationForest {
    /// 新しい Isolation Forest を作成
    pub fn new(contamination: f64) -> Self {
        Self {
            contamination,
            ..Self::default()
        }
    }

    pub fn with_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators.max(1);
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples.max(2);
        self
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// 各点の異常スコア（高いほど異常、0〜1）を計算
    pub fn anomaly_scores(&self, matrix: ArrayView2<f64>) -> Vec<f64> {
        let n = matrix.nrows();
        if n < 2 {
            return vec![0.5; n];
        }

        let sample_size = self.max_samples.min(n);
        let max_depth = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.random_state);

        let trees: Vec<Node> = (0..self.n_estimators)
            .map(|_| {
                let sample = index::sample(&mut rng, n, sample_size).into_vec();
                grow(&matrix, sample, 0, max_depth, &mut rng)
            })
            .collect();

        let normalizer = average_path_length(sample_size);
        (0..n)
            .map(|row| {
                let total: f64 = trees.iter().map(|t| t.path_length(&matrix, row, 0)).sum();
                let mean_depth = total / trees.len() as f64;
                2f64.powf(-mean_depth / normalizer)
            })
            .collect()
    }
}

impl OutlierStrategy for IsolationForest {
    fn fit_flag(&self, matrix: ArrayView2<f64>) -> Result<Vec<bool>> {
        validate_contamination(self.contamination)?;

        let n = matrix.nrows();
        if n < 2 {
            return Ok(vec![false; n]);
        }

        // 正常度スコア（低いほど異常）
        let normality: Vec<f64> = self.anomaly_scores(matrix).iter().map(|s| -s).collect();
        let offset = percentile(&normality, self.contamination);

        let flags: Vec<bool> = normality.iter().map(|s| *s < offset).collect();
        tracing::debug!(
            points = n,
            flagged = flags.iter().filter(|f| **f).count(),
            offset,
            "isolation forest fitted"
        );
        Ok(flags)
    }

    fn name(&self) -> &'static str {
        "isolation_forest"
    }
}

/// 分離木のノード
#[derive(Debug)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn path_length(&self, matrix: &ArrayView2<f64>, row: usize, depth: usize) -> f64 {
        match self {
            Node::Leaf { size } => depth as f64 + average_path_length(*size),
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if matrix[[row, *feature]] <= *threshold {
                    left.path_length(matrix, row, depth + 1)
                } else {
                    right.path_length(matrix, row, depth + 1)
                }
            }
        }
    }
}

fn grow(
    matrix: &ArrayView2<f64>,
    rows: Vec<usize>,
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= max_depth || rows.len() <= 1 {
        return Node::Leaf { size: rows.len() };
    }

    // 値の幅がある特徴量のみ分割候補
    let candidates: Vec<(usize, f64, f64)> = (0..matrix.ncols())
        .filter_map(|feature| {
            let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                let v = matrix[[*r, feature]];
                (lo.min(v), hi.max(v))
            });
            (hi > lo).then_some((feature, lo, hi))
        })
        .collect();

    if candidates.is_empty() {
        return Node::Leaf { size: rows.len() };
    }

    let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = split_threshold(lo, hi, rng.gen());
    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
        .into_iter()
        .partition(|r| matrix[[*r, feature]] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(matrix, left_rows, depth + 1, max_depth, rng)),
        right: Box::new(grow(matrix, right_rows, depth + 1, max_depth, rng)),
    }
}

/// `[lo, hi)` 内の分割値（`t` は 0〜1）
///
/// Interpolates without forming `hi - lo`, which overflows for finite values
/// of opposite sign near `f64::MAX`. Falls back to `lo` whenever the result
/// leaves the interval, so both partitions stay non-empty.
fn split_threshold(lo: f64, hi: f64, t: f64) -> f64 {
    let threshold = lo * (1.0 - t) + hi * t;
    if threshold >= lo && threshold < hi {
        threshold
    } else {
        lo
    }
}

/// 二分探索木の失敗探索の平均経路長 c(n)
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// 線形補間パーセンタイル（`q` は 0〜1）
fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}
