use std::collections::HashMap;

/// One completed run's summary row, the unit the metric registry
/// aggregates over.
#[derive(Debug, Clone)]
pub struct MetricInput {
    pub task_id: String,
    pub success: bool,
    pub reward: f64,
    pub steps: u64,
    pub stop_reason: String,
}

#[derive(Debug, Clone)]
pub struct MetricReport {
    pub success_rate: f64,
    pub avg_reward: f64,
    pub mean_steps: f64,
    pub stop_reason_distribution: HashMap<String, u64>,
    pub pass_at_k: HashMap<u64, f64>,
}

/// Computes the required report over a collection of per-run rows. Rows
/// are grouped by `task_id` to compute pass^k, which needs each task's
/// own (successes, trials) pair, not just the global success rate.
pub fn compute_report(rows: &[MetricInput], num_trials: u64) -> MetricReport {
    if rows.is_empty() {
        return MetricReport {
            success_rate: 0.0,
            avg_reward: 0.0,
            mean_steps: 0.0,
            stop_reason_distribution: HashMap::new(),
            pass_at_k: (1..=num_trials.max(1)).map(|k| (k, 0.0)).collect(),
        };
    }

    let n = rows.len() as f64;
    let success_rate = rows.iter().filter(|r| r.success).count() as f64 / n;
    let avg_reward = rows.iter().map(|r| r.reward).sum::<f64>() / n;
    let mean_steps = rows.iter().map(|r| r.steps as f64).sum::<f64>() / n;

    let mut stop_reason_distribution = HashMap::new();
    for row in rows {
        *stop_reason_distribution.entry(row.stop_reason.clone()).or_insert(0) += 1;
    }

    let mut per_task: HashMap<&str, (u64, u64)> = HashMap::new();
    for row in rows {
        let entry = per_task.entry(row.task_id.as_str()).or_insert((0, 0));
        entry.1 += 1;
        if row.success {
            entry.0 += 1;
        }
    }

    let mut pass_at_k = HashMap::new();
    for k in 1..=num_trials.max(1) {
        let mean = per_task.values().map(|&(c, n)| pass_at_k_for_task(c, n, k)).sum::<f64>() / per_task.len() as f64;
        pass_at_k.insert(k, mean);
    }

    MetricReport { success_rate, avg_reward, mean_steps, stop_reason_distribution, pass_at_k }
}

/// pass^k(task) = C(c, k) / C(n, k) if c >= k else 0.
fn pass_at_k_for_task(c: u64, n: u64, k: u64) -> f64 {
    if c < k || n < k {
        return 0.0;
    }
    binomial(n, k).map_or(0.0, |denom| if denom == 0.0 { 0.0 } else { binomial(c, k).unwrap_or(0.0) / denom })
}

fn binomial(n: u64, k: u64) -> Option<f64> {
    if k > n {
        return Some(0.0);
    }
    let k = k.min(n - k);
    let mut result = 1.0f64;
    for i in 0..k {
        result *= (n - i) as f64 / (i + 1) as f64;
    }
    Some(result)
}
