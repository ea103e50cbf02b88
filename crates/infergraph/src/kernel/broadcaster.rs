//! Multidirectional broadcast planner.
//!
//! Semantics follow ONNX multidirectional broadcasting. The planner builds
//! every input's strides in one right-to-left sweep and applies two
//! optimizations:
//!
//! - dimensions where every input is 1 are eliminated;
//! - adjacent dimensions are merged while no input changes between
//!   broadcasting and not broadcasting, e.g. `{2,3,4,5,6}` against
//!   `{2,3,1,5,6}` collapses to `{6,4,30}` against `{6,1,30}`.
//!
//! Each emitted stride row covers one merged run; the row count equals the
//! number of broadcast-state transitions, usually far below the rank.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BroadcastError {
    #[error("broadcaster requires at least one input")]
    NoInputs,
    #[error("broadcast shape mismatch: {0} vs {1}")]
    Mismatch(usize, usize),
}

/// Compact striding plan for an N-ary element-wise operation.
///
/// `strides` is row-major: each row holds one linear stride per input
/// followed by the output stride for the run it covers. An entry of 0 means
/// the input broadcasts (is replicated) across that run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcaster {
    strides: Vec<usize>,
    pub outputs_count: usize,
    pub inputs_count: usize,
}

impl Broadcaster {
    /// Plans the broadcast of the given input dimension lists.
    pub fn new(inputs: &[&[usize]]) -> Result<Self, BroadcastError> {
        let inputs_count = inputs.len();
        if inputs_count == 0 {
            return Err(BroadcastError::NoInputs);
        }

        let mut iters: Vec<_> = inputs.iter().map(|dims| dims.iter().rev()).collect();
        let mut broadcast_state = vec![false; inputs_count];
        let mut muls = vec![1usize; inputs_count + 1];
        let mut strides = Vec::new();

        loop {
            let mut all_end = true;
            let mut shape = 1usize;
            let mut broadcast_next = vec![false; inputs_count];
            for (i, it) in iters.iter_mut().enumerate() {
                if let Some(&dim) = it.next() {
                    all_end = false;
                    broadcast_next[i] = dim != 1;
                    if dim != 1 {
                        if shape == 1 {
                            shape = dim;
                        } else if shape != dim {
                            return Err(BroadcastError::Mismatch(shape, dim));
                        }
                    }
                }
            }
            if all_end {
                break;
            }
            if shape == 1 {
                continue;
            }

            if broadcast_next != broadcast_state {
                broadcast_state = broadcast_next;
                let row = strides.len();
                strides.resize(row + inputs_count + 1, 0);
                for i in 0..inputs_count {
                    if broadcast_state[i] {
                        strides[row + i] = muls[i];
                        muls[i] *= shape;
                    }
                }
                strides[row + inputs_count] = muls[inputs_count];
            } else {
                for i in 0..inputs_count {
                    if broadcast_state[i] {
                        muls[i] *= shape;
                    }
                }
            }
            muls[inputs_count] *= shape;
        }

        let outputs_count = if strides.is_empty() {
            1
        } else {
            // Rows were emitted innermost first; flip to iteration order.
            strides = strides
                .chunks_exact(inputs_count + 1)
                .rev()
                .flatten()
                .copied()
                .collect();
            muls[inputs_count] * strides[strides.len() - 1]
        };

        Ok(Broadcaster {
            strides,
            outputs_count,
            inputs_count,
        })
    }

    /// Number of merged stride rows in the plan.
    pub fn rows(&self) -> usize {
        self.strides.len() / (self.inputs_count + 1)
    }

    /// Decodes output position `k` into one linear offset per input.
    pub fn locate(&self, k: usize, ans: &mut [usize]) {
        debug_assert_eq!(ans.len(), self.inputs_count);
        ans.fill(0);
        let mut rem = k;
        for row in self.strides.chunks_exact(self.inputs_count + 1) {
            let quot = rem / row[self.inputs_count];
            rem %= row[self.inputs_count];
            for (an, &stride) in ans.iter_mut().zip(row) {
                *an += stride * quot;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_runs_with_stable_broadcast_state() {
        let plan =
            Broadcaster::new(&[&[2, 3, 4, 5, 6], &[2, 3, 1, 5, 6]]).unwrap();
        assert_eq!(plan.rows(), 3);
        assert_eq!(plan.outputs_count, 720);
    }

    #[test]
    fn equal_shapes_collapse_to_one_row() {
        let plan = Broadcaster::new(&[&[2, 3, 4], &[2, 3, 4]]).unwrap();
        assert_eq!(plan.rows(), 1);
        assert_eq!(plan.outputs_count, 24);
        let mut ans = [0usize; 2];
        plan.locate(17, &mut ans);
        assert_eq!(ans, [17, 17]);
    }

    #[test]
    fn locate_covers_every_input_position() {
        // [3] against [2, 1]: output [2, 3].
        let plan = Broadcaster::new(&[&[3], &[2, 1]]).unwrap();
        assert_eq!(plan.outputs_count, 6);
        let mut seen = Vec::new();
        for k in 0..plan.outputs_count {
            let mut ans = [0usize; 2];
            plan.locate(k, &mut ans);
            assert!(ans[0] < 3);
            assert!(ans[1] < 2);
            seen.push(ans);
        }
        assert_eq!(
            seen,
            vec![[0, 0], [1, 0], [2, 0], [0, 1], [1, 1], [2, 1]]
        );
    }

    #[test]
    fn all_one_dimensions_vanish() {
        let plan = Broadcaster::new(&[&[1, 1, 1], &[1, 1]]).unwrap();
        assert_eq!(plan.rows(), 0);
        assert_eq!(plan.outputs_count, 1);
    }

    #[test]
    fn rejects_incompatible_dimensions() {
        assert_eq!(
            Broadcaster::new(&[&[2, 3], &[2, 4]]),
            Err(BroadcastError::Mismatch(3, 4))
        );
    }
}
