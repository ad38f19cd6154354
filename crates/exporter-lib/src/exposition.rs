//! Prometheus text exposition of a [`MetricModel`]

use crate::model::{MetricModel, MetricSample};

/// Render the model as Prometheus text.
///
/// Series appear in model order and samples in insertion order. Lines are
/// joined with `\n` and the text has no trailing newline. Label values are
/// written verbatim; they are engine-generated IDs and names.
pub fn compile(model: &MetricModel) -> String {
    let mut lines = Vec::new();

    for (name, series) in model.iter() {
        lines.push(format!("# HELP {} {}", name, series.help()));
        lines.push(format!("# TYPE {} {}", name, series.metric_type()));
        for sample in series.samples() {
            lines.push(sample_line(name, sample));
        }
    }

    lines.join("\n")
}

fn sample_line(name: &str, sample: &MetricSample) -> String {
    if sample.labels.is_empty() {
        return format!("{} {}", name, sample.value);
    }

    let labels = sample
        .labels
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", key, value))
        .collect::<Vec<_>>()
        .join(",");

    format!("{}{{{}}} {}", name, labels, sample.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{build, LabelSet, MetricType};
    use crate::models::RawContainerRecord;
    use serde_json::json;

    fn containers() -> Vec<RawContainerRecord> {
        let running = json!({
            "Id": "c0ffee",
            "Name": "/web",
            "RestartCount": 0,
            "Created": "2024-03-01T10:00:00.000000001Z",
            "State": {
                "OOMKilled": false, "Running": true, "Paused": false,
                "Restarting": false, "Dead": false, "ExitCode": 0,
                "StartedAt": "2024-03-01T10:00:01Z",
                "FinishedAt": "0001-01-01T00:00:00Z"
            }
        });
        let exited = json!({
            "Id": "deadbeef",
            "Name": "/batch-job_1",
            "RestartCount": 3,
            "Created": "2024-03-01T09:00:00Z",
            "State": {
                "OOMKilled": true, "Running": false, "Paused": false,
                "Restarting": false, "Dead": false, "ExitCode": 137,
                "StartedAt": "2024-03-01T09:00:01Z",
                "FinishedAt": "2024-03-01T09:30:00.5Z"
            }
        });
        vec![
            serde_json::from_value(running).unwrap(),
            serde_json::from_value(exited).unwrap(),
        ]
    }

    #[test]
    fn test_exit_code_block_for_two_containers() {
        let text = compile(&build(&containers()).unwrap());

        let type_lines = text
            .lines()
            .filter(|l| *l == "# TYPE container_status_exit_code gauge")
            .count();
        assert_eq!(type_lines, 1);

        let samples: Vec<_> = text
            .lines()
            .filter(|l| l.starts_with("container_status_exit_code{"))
            .collect();
        assert_eq!(
            samples,
            vec![
                r#"container_status_exit_code{id="c0ffee",name="web"} 0"#,
                r#"container_status_exit_code{id="deadbeef",name="batch-job_1"} 137"#,
            ]
        );
    }

    #[test]
    fn test_state_lines_put_status_first() {
        let text = compile(&build(&containers()).unwrap());
        assert!(text
            .lines()
            .any(|l| l == r#"container_status_state{status="oom_killed",id="deadbeef",name="batch-job_1"} 1"#));
        assert!(text
            .lines()
            .any(|l| l == r#"container_status_state{status="running",id="c0ffee",name="web"} 1"#));
    }

    #[test]
    fn test_empty_model_has_headers_only() {
        let text = compile(&build(&[]).unwrap());
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 12);
        assert!(lines.iter().all(|l| l.starts_with("# ")));
        assert_eq!(lines.iter().filter(|l| l.starts_with("# HELP ")).count(), 6);
        assert_eq!(lines.iter().filter(|l| l.starts_with("# TYPE ")).count(), 6);
        assert_eq!(lines[1], "# TYPE container_status_state gauge");
        assert_eq!(lines[5], "# TYPE container_status_restart_count counter");
    }

    #[test]
    fn test_no_blank_lines_or_trailing_newline() {
        let text = compile(&build(&containers()).unwrap());
        assert!(!text.ends_with('\n'));
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn test_header_then_samples_per_series() {
        let mut model = MetricModel::new();
        model.declare("up", MetricType::Gauge, "Whether the target is up");
        model
            .get_mut("up")
            .unwrap()
            .push(MetricSample::new(1, LabelSet::new()));
        model.declare("hits", MetricType::Counter, "Hits");

        assert_eq!(
            compile(&model),
            "# HELP up Whether the target is up\n# TYPE up gauge\nup 1\n# HELP hits Hits\n# TYPE hits counter"
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        let records = containers();
        let first = compile(&build(&records).unwrap());
        let second = compile(&build(&records).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_label_values_written_verbatim() {
        let mut labels = LabelSet::new();
        labels.insert("name".to_string(), "my.app-1_blue".to_string());
        let sample = MetricSample::new(2, labels);
        assert_eq!(sample_line("m", &sample), r#"m{name="my.app-1_blue"} 2"#);
    }
}
