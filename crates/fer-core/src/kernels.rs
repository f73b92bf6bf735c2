//! Numeric kernels for the forward pass.
//!
//! All kernels are pure: they borrow their inputs and allocate a fresh
//! output. Arithmetic is `f32` throughout and NaN/Inf propagate unchanged.
//! Summation order is fixed (bias first, then input channel, kernel row,
//! kernel column) so results are reproducible for a given input.

// Index arithmetic on small, checked dimensions.
#![allow(clippy::many_single_char_names)]

use crate::error::ShapeError;
use crate::tensor::Tensor;

/// Same-size 2-D convolution, stride 1, zero padding `(K - 1) / 2`.
///
/// `input` is `[1, Cin, H, W]`, `weight` is `[Cout, Cin, K, K]` with odd `K`,
/// `bias` is `[Cout]`. Output is `[1, Cout, H, W]`.
///
/// # Errors
///
/// Returns a [`ShapeError`] if ranks, channel counts or the kernel shape do
/// not line up.
pub fn conv2d(input: &Tensor, weight: &Tensor, bias: &Tensor) -> Result<Tensor, ShapeError> {
    let (c_in, h, w) = input.nchw("conv2d")?;
    let &[c_out, w_in, k, k2] = weight.shape() else {
        return Err(ShapeError::Rank {
            op: "conv2d",
            expected: 4,
            actual: weight.shape().to_vec(),
        });
    };
    if w_in != c_in || k != k2 || k % 2 == 0 {
        return Err(ShapeError::Incompatible {
            op: "conv2d",
            left: input.shape().to_vec(),
            right: weight.shape().to_vec(),
        });
    }
    if bias.shape() != [c_out] {
        return Err(ShapeError::Incompatible {
            op: "conv2d",
            left: weight.shape().to_vec(),
            right: bias.shape().to_vec(),
        });
    }

    let pad = (k - 1) / 2;
    let x = input.data();
    let wt = weight.data();
    let mut out = vec![0.0f32; c_out * h * w];

    for oc in 0..c_out {
        let b = bias.data()[oc];
        for i in 0..h {
            for j in 0..w {
                let mut sum = b;
                for ic in 0..c_in {
                    let x_plane = &x[ic * h * w..(ic + 1) * h * w];
                    let w_kernel = &wt[(oc * c_in + ic) * k * k..(oc * c_in + ic + 1) * k * k];
                    for ki in 0..k {
                        // Padded row i + ki maps to input row i + ki - pad.
                        let Some(row) = (i + ki).checked_sub(pad).filter(|&r| r < h) else {
                            continue;
                        };
                        for kj in 0..k {
                            let Some(col) = (j + kj).checked_sub(pad).filter(|&c| c < w) else {
                                continue;
                            };
                            sum += x_plane[row * w + col] * w_kernel[ki * k + kj];
                        }
                    }
                }
                out[(oc * h + i) * w + j] = sum;
            }
        }
    }

    Tensor::new(out, vec![1, c_out, h, w])
}

/// Elementwise `max(0, x)`.
#[must_use]
pub fn relu(input: &Tensor) -> Tensor {
    input.map(|v| if v > 0.0 || v.is_nan() { v } else { 0.0 })
}

/// Non-overlapping 2x2 max pooling, stride 2.
///
/// `input` is `[1, C, H, W]` with even `H` and `W`; output is
/// `[1, C, H / 2, W / 2]`.
///
/// # Errors
///
/// Returns [`ShapeError::OddSpatial`] for odd spatial dimensions, or
/// [`ShapeError::Rank`] if the input is not `[1, C, H, W]`.
pub fn max_pool2x2(input: &Tensor) -> Result<Tensor, ShapeError> {
    let (c, h, w) = input.nchw("max_pool2x2")?;
    if h % 2 != 0 || w % 2 != 0 {
        return Err(ShapeError::OddSpatial {
            op: "max_pool2x2",
            height: h,
            width: w,
        });
    }

    let (oh, ow) = (h / 2, w / 2);
    let x = input.data();
    let mut out = Vec::with_capacity(c * oh * ow);

    for ch in 0..c {
        let plane = &x[ch * h * w..(ch + 1) * h * w];
        for i in 0..oh {
            let top = &plane[(2 * i) * w..(2 * i + 1) * w];
            let bottom = &plane[(2 * i + 1) * w..(2 * i + 2) * w];
            for j in 0..ow {
                let window = [top[2 * j], top[2 * j + 1], bottom[2 * j], bottom[2 * j + 1]];
                out.push(window.into_iter().fold(f32::NEG_INFINITY, max_propagating_nan));
            }
        }
    }

    Tensor::new(out, vec![1, c, oh, ow])
}

/// Dense layer: `y = x . weight^T + bias`.
///
/// `input` is `[1, N]`, `weight` is `[M, N]`, `bias` is `[M]`; output is `[1, M]`.
///
/// # Errors
///
/// Returns a [`ShapeError`] if the operand shapes disagree.
pub fn linear(input: &Tensor, weight: &Tensor, bias: &Tensor) -> Result<Tensor, ShapeError> {
    let &[1, n] = input.shape() else {
        return Err(ShapeError::Rank {
            op: "linear",
            expected: 2,
            actual: input.shape().to_vec(),
        });
    };
    let &[m, n2] = weight.shape() else {
        return Err(ShapeError::Rank {
            op: "linear",
            expected: 2,
            actual: weight.shape().to_vec(),
        });
    };
    if n2 != n {
        return Err(ShapeError::Incompatible {
            op: "linear",
            left: input.shape().to_vec(),
            right: weight.shape().to_vec(),
        });
    }
    if bias.shape() != [m] {
        return Err(ShapeError::Incompatible {
            op: "linear",
            left: weight.shape().to_vec(),
            right: bias.shape().to_vec(),
        });
    }

    // chunks_exact(0) panics
    if n == 0 {
        return Tensor::new(bias.data().to_vec(), vec![1, m]);
    }

    let x = input.data();
    let out = weight
        .data()
        .chunks_exact(n)
        .zip(bias.data())
        .map(|(row, &b)| row.iter().zip(x).fold(b, |acc, (&wv, &xv)| acc + wv * xv))
        .collect();

    Tensor::new(out, vec![1, m])
}

/// Numerically stable softmax over all elements, keeping the input shape.
#[must_use]
pub fn softmax(input: &Tensor) -> Tensor {
    let max = input
        .data()
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max);
    let exps = input.map(|v| (v - max).exp());
    let sum: f32 = exps.data().iter().sum();
    exps.map(|e| e / sum)
}

fn max_propagating_nan(acc: f32, v: f32) -> f32 {
    if acc.is_nan() || v.is_nan() {
        f32::NAN
    } else {
        acc.max(v)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::cast_precision_loss)]
mod tests {
    use super::*;

    fn t(data: Vec<f32>, shape: &[usize]) -> Tensor {
        Tensor::new(data, shape.to_vec()).unwrap()
    }

    #[test]
    fn test_conv2d_ones_counts_overlap() {
        let input = t(vec![1.0; 16], &[1, 1, 4, 4]);
        let weight = t(vec![1.0; 9], &[1, 1, 3, 3]);
        let bias = t(vec![0.0], &[1]);

        let out = conv2d(&input, &weight, &bias).unwrap();
        assert_eq!(out.shape(), &[1, 1, 4, 4]);
        #[rustfmt::skip]
        let expected = [
            4.0, 6.0, 6.0, 4.0,
            6.0, 9.0, 9.0, 6.0,
            6.0, 9.0, 9.0, 6.0,
            4.0, 6.0, 6.0, 4.0,
        ];
        assert_eq!(out.data(), &expected);
    }

    #[test]
    fn test_conv2d_adds_bias_per_channel() {
        let input = t(vec![0.0; 4], &[1, 1, 2, 2]);
        let weight = t(vec![1.0; 18], &[2, 1, 3, 3]);
        let bias = t(vec![0.5, -1.0], &[2]);

        let out = conv2d(&input, &weight, &bias).unwrap();
        assert_eq!(out.data(), &[0.5, 0.5, 0.5, 0.5, -1.0, -1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_conv2d_is_cross_correlation() {
        // Only the kernel's top-left tap is set, so each output reads the
        // input pixel up and to the left of it.
        let input = t((1..=9).map(|v| v as f32).collect(), &[1, 1, 3, 3]);
        let mut k = vec![0.0; 9];
        k[0] = 1.0;
        let weight = t(k, &[1, 1, 3, 3]);
        let bias = t(vec![0.0], &[1]);

        let out = conv2d(&input, &weight, &bias).unwrap();
        assert_eq!(out.data(), &[0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 4.0, 5.0]);
    }

    #[test]
    fn test_conv2d_sums_input_channels() {
        let input = t(vec![1.0, 2.0], &[1, 2, 1, 1]);
        let mut k = vec![0.0; 18];
        k[4] = 10.0;
        k[13] = 100.0;
        let weight = t(k, &[1, 2, 3, 3]);
        let bias = t(vec![1.0], &[1]);

        let out = conv2d(&input, &weight, &bias).unwrap();
        assert_eq!(out.data(), &[211.0]);
    }

    #[test]
    fn test_conv2d_rejects_channel_mismatch() {
        let input = t(vec![0.0; 8], &[1, 2, 2, 2]);
        let weight = t(vec![0.0; 9], &[1, 1, 3, 3]);
        let bias = t(vec![0.0], &[1]);
        assert!(matches!(
            conv2d(&input, &weight, &bias),
            Err(ShapeError::Incompatible { op: "conv2d", .. })
        ));
    }

    #[test]
    fn test_conv2d_rejects_wrong_bias() {
        let input = t(vec![0.0; 4], &[1, 1, 2, 2]);
        let weight = t(vec![0.0; 9], &[1, 1, 3, 3]);
        let bias = t(vec![0.0; 2], &[2]);
        assert!(conv2d(&input, &weight, &bias).is_err());
    }

    #[test]
    fn test_relu() {
        let out = relu(&t(vec![-1.0, 0.0, 2.5, -0.0], &[2, 2]));
        assert_eq!(out.data(), &[0.0, 0.0, 2.5, 0.0]);
        assert_eq!(out.shape(), &[2, 2]);
    }

    #[test]
    fn test_relu_propagates_nan() {
        let out = relu(&Tensor::flat(vec![f32::NAN]));
        assert!(out.data()[0].is_nan());
    }

    #[test]
    fn test_max_pool_single_window() {
        let out = max_pool2x2(&t(vec![1.0, 5.0, 3.0, 2.0], &[1, 1, 2, 2])).unwrap();
        assert_eq!(out.shape(), &[1, 1, 1, 1]);
        assert_eq!(out.data(), &[5.0]);
    }

    #[test]
    fn test_max_pool_windows_and_channels() {
        #[rustfmt::skip]
        let data = vec![
            1.0, 2.0, 3.0, 4.0,
            5.0, 6.0, 7.0, 8.0,
            -1.0, -2.0, -3.0, -4.0,
            -5.0, -6.0, -7.0, -8.0,
            // channel 1
            0.0, 0.0, 0.0, 9.0,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0,
        ];
        let out = max_pool2x2(&t(data, &[1, 2, 4, 4])).unwrap();
        assert_eq!(out.shape(), &[1, 2, 2, 2]);
        assert_eq!(out.data(), &[6.0, 8.0, -1.0, -3.0, 0.0, 9.0, 0.0, 0.0]);
    }

    #[test]
    fn test_max_pool_rejects_odd_dimensions() {
        let err = max_pool2x2(&t(vec![0.0; 6], &[1, 1, 3, 2])).unwrap_err();
        assert_eq!(
            err,
            ShapeError::OddSpatial {
                op: "max_pool2x2",
                height: 3,
                width: 2
            }
        );
    }

    #[test]
    fn test_linear() {
        let x = t(vec![1.0, 2.0], &[1, 2]);
        let w = t(vec![1.0, 1.0, 2.0, 2.0], &[2, 2]);
        let b = t(vec![0.0, 1.0], &[2]);

        let y = linear(&x, &w, &b).unwrap();
        assert_eq!(y.shape(), &[1, 2]);
        assert_eq!(y.data(), &[3.0, 7.0]);
    }

    #[test]
    fn test_linear_rejects_feature_mismatch() {
        let x = t(vec![1.0, 2.0, 3.0], &[1, 3]);
        let w = t(vec![1.0; 4], &[2, 2]);
        let b = t(vec![0.0; 2], &[2]);
        assert!(matches!(
            linear(&x, &w, &b),
            Err(ShapeError::Incompatible { op: "linear", .. })
        ));
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let p = softmax(&t(vec![1.0, 2.0, 3.0], &[1, 3]));
        let sum: f32 = p.data().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(p.data()[2] > p.data()[1] && p.data()[1] > p.data()[0]);
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        let p = softmax(&t(vec![1000.0, 1000.0], &[1, 2]));
        assert!((p.data()[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_kernels_do_not_mutate_inputs() {
        let input = t(vec![-1.0, 2.0, -3.0, 4.0], &[1, 1, 2, 2]);
        let copy = input.clone();
        let _ = relu(&input);
        let _ = max_pool2x2(&input).unwrap();
        assert_eq!(input, copy);
    }
}
