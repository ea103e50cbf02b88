use infergraph::kernel::Broadcaster;

/// Reference coordinate math used to cross-check `locate`.
fn naive_offsets(inputs: &[&[usize]], out_dims: &[usize], k: usize) -> Vec<usize> {
    let mut coords = vec![0usize; out_dims.len()];
    let mut rem = k;
    for (coord, &dim) in coords.iter_mut().zip(out_dims).rev() {
        *coord = rem % dim;
        rem /= dim;
    }
    inputs
        .iter()
        .map(|dims| {
            let skip = out_dims.len() - dims.len();
            let mut offset = 0;
            let mut mul = 1;
            for (axis, &dim) in dims.iter().enumerate().rev() {
                if dim != 1 {
                    offset += coords[skip + axis] * mul;
                }
                mul *= dim;
            }
            offset
        })
        .collect()
}

#[test]
fn adjacent_runs_collapse_into_three_rows() {
    let plan = Broadcaster::new(&[&[2, 3, 4, 5, 6], &[2, 3, 1, 5, 6]]).unwrap();
    assert_eq!(plan.rows(), 3);
    assert_eq!(plan.outputs_count, 2 * 3 * 4 * 5 * 6);
}

#[test]
fn locate_agrees_with_naive_relinearization() {
    let cases: &[(&[usize], &[usize], &[usize])] = &[
        (&[3], &[2, 1], &[2, 3]),
        (&[2, 3, 4, 5, 6], &[2, 3, 1, 5, 6], &[2, 3, 4, 5, 6]),
        (&[1, 4], &[3, 1], &[3, 4]),
        (&[2, 1, 3], &[1, 5, 3], &[2, 5, 3]),
        (&[7], &[7], &[7]),
    ];
    for &(a, b, out_dims) in cases {
        let inputs = [a, b];
        let plan = Broadcaster::new(&inputs).unwrap();
        assert_eq!(plan.outputs_count, out_dims.iter().product::<usize>());
        let mut ans = [0usize; 2];
        for k in 0..plan.outputs_count {
            plan.locate(k, &mut ans);
            assert_eq!(
                ans.to_vec(),
                naive_offsets(&inputs, out_dims, k),
                "shapes {a:?} x {b:?} at position {k}"
            );
        }
    }
}

#[test]
fn every_decoded_offset_stays_in_bounds_and_output_is_covered() {
    let a: &[usize] = &[4, 1, 5];
    let b: &[usize] = &[1, 3, 1];
    let plan = Broadcaster::new(&[a, b]).unwrap();
    assert_eq!(plan.outputs_count, 60);
    let (a_len, b_len) = (20usize, 3usize);
    let mut hits_a = vec![0usize; a_len];
    let mut hits_b = vec![0usize; b_len];
    let mut ans = [0usize; 2];
    for k in 0..plan.outputs_count {
        plan.locate(k, &mut ans);
        assert!(ans[0] < a_len);
        assert!(ans[1] < b_len);
        hits_a[ans[0]] += 1;
        hits_b[ans[1]] += 1;
    }
    // Each input position is visited output/input times.
    assert!(hits_a.iter().all(|&n| n == 3));
    assert!(hits_b.iter().all(|&n| n == 20));
}

#[test]
fn three_way_broadcast() {
    let plan = Broadcaster::new(&[&[2, 1], &[1, 3], &[1, 1]]).unwrap();
    assert_eq!(plan.outputs_count, 6);
    let mut ans = [0usize; 3];
    plan.locate(4, &mut ans);
    // Output position (1, 1): input a at row 1, input b at column 1, scalar at 0.
    assert_eq!(ans, [1, 1, 0]);
}
