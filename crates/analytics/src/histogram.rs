use core_types::HistogramBucket;

/// Number of buckets used for simulated price distributions.
pub const DEFAULT_BUCKETS: usize = 20;

/// Buckets `samples` into `bucket_count` equal-width ranges spanning the
/// smallest to the largest finite sample.
///
/// Bucket `i` covers `[min + i*w, min + (i+1)*w)`, except the last, which is
/// closed so the maximum lands inside it. Every sample is counted exactly
/// once: when all samples are equal they fall in the first bucket, and
/// non-finite samples are clamped to the nearest end. Labels are
/// `"{lower}-{upper}"` with `label_precision` decimals.
pub fn histogram(samples: &[f64], bucket_count: usize, label_precision: usize) -> Vec<HistogramBucket> {
    if bucket_count == 0 {
        return Vec::new();
    }

    let (mut min, mut max) = samples
        .iter()
        .filter(|s| s.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        });
    if min > max {
        // No finite samples.
        min = 0.0;
        max = 0.0;
    }

    let width = (max - min) / bucket_count as f64;

    let mut buckets: Vec<HistogramBucket> = (0..bucket_count)
        .map(|i| {
            let lower = min + i as f64 * width;
            let upper = if i + 1 == bucket_count {
                max
            } else {
                min + (i + 1) as f64 * width
            };
            HistogramBucket {
                label: format!(
                    "{:.p$}-{:.p$}",
                    lower,
                    upper,
                    p = label_precision
                ),
                lower,
                upper,
                frequency: 0,
            }
        })
        .collect();

    for &sample in samples {
        buckets[bucket_index(sample, min, width, bucket_count)].frequency += 1;
    }

    buckets
}

fn bucket_index(sample: f64, min: f64, width: f64, bucket_count: usize) -> usize {
    if width <= 0.0 || !width.is_finite() {
        return 0;
    }
    let raw = ((sample - min) / width).floor();
    if raw.is_nan() || raw < 0.0 {
        0
    } else {
        // Saturating cast, then clamp the maximum into the last bucket.
        (raw as usize).min(bucket_count - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn frequencies(buckets: &[HistogramBucket]) -> Vec<usize> {
        buckets.iter().map(|b| b.frequency).collect()
    }

    #[test]
    fn evenly_spread_samples_fill_one_bucket_each() {
        let buckets = histogram(&[1.0, 2.0, 3.0, 4.0, 5.0], 5, 0);

        assert_eq!(frequencies(&buckets), vec![1, 1, 1, 1, 1]);
        assert_eq!(buckets[0].lower, 1.0);
        assert_eq!(buckets[4].upper, 5.0);
    }

    #[test]
    fn identical_samples_land_in_the_first_bucket() {
        let buckets = histogram(&[7.0, 7.0, 7.0], 4, 0);

        assert_eq!(buckets.len(), 4);
        assert_eq!(frequencies(&buckets), vec![3, 0, 0, 0]);
        assert_eq!(buckets[0].label, "7-7");
    }

    #[test]
    fn labels_use_requested_precision() {
        let buckets = histogram(&[100.0, 200.0], 2, 0);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["100-150", "150-200"]);

        let buckets = histogram(&[0.0, 1.0], 4, 2);
        assert_eq!(buckets[1].label, "0.25-0.50");
    }

    #[test]
    fn edges_are_contiguous_and_ascending() {
        let buckets = histogram(&[3.2, 9.9, 4.4, 7.1, 5.0], 6, 1);

        for pair in buckets.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower);
            assert!(pair[0].lower <= pair[1].lower);
        }
    }

    #[rstest]
    #[case::empty(vec![], 20)]
    #[case::single(vec![42.0], 20)]
    #[case::skewed(vec![1.0, 1.0, 1.0, 1000.0], 20)]
    #[case::negative(vec![-5.0, -1.0, 0.0, 3.5], 3)]
    #[case::non_finite(vec![1.0, f64::NAN, f64::INFINITY, 2.0], 4)]
    fn frequencies_sum_to_sample_count(#[case] samples: Vec<f64>, #[case] buckets: usize) {
        let result = histogram(&samples, buckets, 0);

        assert_eq!(result.len(), buckets);
        assert_eq!(result.iter().map(|b| b.frequency).sum::<usize>(), samples.len());
    }

    #[test]
    fn zero_buckets_is_empty() {
        assert!(histogram(&[1.0, 2.0], 0, 0).is_empty());
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        let samples = [61234.5, 58900.0, 70111.25, 64000.0, 59999.99, 66500.0];

        let first = serde_json::to_string(&histogram(&samples, DEFAULT_BUCKETS, 0)).unwrap();
        let again = serde_json::to_string(&histogram(&samples, DEFAULT_BUCKETS, 0)).unwrap();

        assert_eq!(first, again);
    }
}
