use std::collections::HashMap;

const AUTOJUNK_MIN_LEN: usize = 200;

pub fn ratio(a: &str, b: &str) -> f64 {
    let a = a.chars().collect::<Vec<char>>();
    let b = b.chars().collect::<Vec<char>>();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matches = SequenceMatcher::new(&a, &b).matching_characters();
    2.0 * matches as f64 / total as f64
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b2j: HashMap<char, Vec<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a_start: usize,
    b_start: usize,
    size: usize,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (index, character) in b.iter().enumerate() {
            b2j.entry(*character).or_default().push(index);
        }

        // Characters filling over 1% of a long `b` are popular and never seed a block.
        if b.len() >= AUTOJUNK_MIN_LEN {
            let popular_threshold = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= popular_threshold);
        }

        Self { a, b, b2j }
    }

    fn matching_characters(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((a_lo, a_hi, b_lo, b_hi)) = queue.pop() {
            let block = self.longest_match(a_lo, a_hi, b_lo, b_hi);
            if block.size == 0 {
                continue;
            }

            total += block.size;
            if a_lo < block.a_start && b_lo < block.b_start {
                queue.push((a_lo, block.a_start, b_lo, block.b_start));
            }
            let a_end = block.a_start + block.size;
            let b_end = block.b_start + block.size;
            if a_end < a_hi && b_end < b_hi {
                queue.push((a_end, a_hi, b_end, b_hi));
            }
        }

        total
    }

    fn longest_match(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> Block {
        let mut best = Block {
            a_start: a_lo,
            b_start: b_lo,
            size: 0,
        };

        let mut run_lengths: HashMap<usize, usize> = HashMap::new();
        for i in a_lo..a_hi {
            let mut next_run_lengths = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }

                    let previous = if j == 0 {
                        0
                    } else {
                        run_lengths.get(&(j - 1)).copied().unwrap_or(0)
                    };
                    let length = previous + 1;
                    next_run_lengths.insert(j, length);

                    if length > best.size {
                        best = Block {
                            a_start: i + 1 - length,
                            b_start: j + 1 - length,
                            size: length,
                        };
                    }
                }
            }
            run_lengths = next_run_lengths;
        }

        // Popular characters never seed a block but may still extend one.
        while best.a_start > a_lo
            && best.b_start > b_lo
            && self.a[best.a_start - 1] == self.b[best.b_start - 1]
        {
            best.a_start -= 1;
            best.b_start -= 1;
            best.size += 1;
        }
        while best.a_start + best.size < a_hi
            && best.b_start + best.size < b_hi
            && self.a[best.a_start + best.size] == self.b[best.b_start + best.size]
        {
            best.size += 1;
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn identical_and_disjoint_strings() {
        assert_close(ratio("alerts", "alerts"), 1.0);
        assert_close(ratio("abc", "xyz"), 0.0);
        assert_close(ratio("", ""), 1.0);
        assert_close(ratio("abc", ""), 0.0);
    }

    #[test]
    fn known_difflib_ratios() {
        assert_close(ratio("abcd", "bcde"), 0.75);
        assert_close(ratio("tide", "diet"), 0.25);
        assert_close(ratio("qabxcd", "abycdf"), 8.0 / 12.0);
    }

    #[test]
    fn query_containing_the_whole_title_scores_above_half() {
        let forward = ratio("do i set up low stock alerts", "low stock alerts");
        assert!(forward > 0.5 && forward <= 1.0);
        assert_close(forward, 32.0 / 44.0);
    }

    #[test]
    fn long_sequences_ignore_popular_characters_as_seeds() {
        let b = format!("{}xyz", "a".repeat(250));
        let a = format!("b{}xyz", "a".repeat(10));
        // 'a' is popular in b: only "xyz" seeds a block, which then grows
        // leftwards over the a-run.
        assert_close(ratio(&a, &b), 26.0 / 267.0);
    }

    #[test]
    fn popular_characters_still_extend_from_the_range_start() {
        let b = "a".repeat(250);
        let a = "a".repeat(10);
        assert_close(ratio(&a, &b), 20.0 / 260.0);
    }
}
