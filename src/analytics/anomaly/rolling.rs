//! Rolling Statistics
//!
//! 末尾ウィンドウの移動平均・移動標準偏差

use statrs::statistics::Statistics;

/// 移動統計量
#[derive(Debug, Clone, PartialEq)]
pub struct RollingStats {
    pub mean: Vec<Option<f64>>,
    pub std: Vec<Option<f64>>,
}

impl RollingStats {
    /// 末尾 `window` 点（当日を含む）の平均と標本標準偏差を計算
    ///
    /// The first `window - 1` entries are undefined. The standard deviation
    /// needs at least two points, so it stays undefined everywhere when
    /// `window < 2`.
    pub fn compute(values: &[f64], window: usize) -> Self {
        let n = values.len();
        let mut mean = vec![None; n];
        let mut std = vec![None; n];

        if window == 0 {
            return Self { mean, std };
        }

        for end in (window - 1)..n {
            // sorted so that equal multisets yield bit-identical statistics
            let mut slice = values[end + 1 - window..=end].to_vec();
            slice.sort_by(f64::total_cmp);

            mean[end] = Some(slice.iter().mean());
            if window >= 2 {
                std[end] = if slice[0] == slice[window - 1] {
                    Some(0.0)
                } else {
                    Some(slice.iter().std_dev())
                };
            }
        }

        Self { mean, std }
    }
}
