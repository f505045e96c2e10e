//! 题目裁剪区域计算 - 业务能力层
//!
//! 只依据本页题号标签的位置推算每道题占据的矩形，不看图片内容：
//! 1. 按标签左边缘聚成若干列
//! 2. 左右边界取相邻两列中心的中点
//! 3. 上边界在标签上方留白，下边界取同列下一题标签；没有下一题时按列内题距估算

use std::collections::BTreeMap;

use crate::config::CropSettings;
use crate::models::{CropRect, LabelBox, QuestionId};

#[derive(Debug)]
struct Column {
    center: f64,
    members: Vec<(QuestionId, LabelBox)>,
}

/// 按左边缘聚类，列中心取成员左边缘的均值
fn cluster_columns(labels: &BTreeMap<QuestionId, LabelBox>, tolerance: f64) -> Vec<Column> {
    let mut items: Vec<(QuestionId, LabelBox)> = labels.iter().map(|(id, b)| (*id, *b)).collect();
    items.sort_by(|(id_a, a), (id_b, b)| {
        a.left
            .total_cmp(&b.left)
            .then(a.top.total_cmp(&b.top))
            .then(id_a.cmp(id_b))
    });

    let mut columns: Vec<Column> = Vec::new();
    for (id, label) in items {
        match columns.last_mut() {
            Some(col) if (label.left - col.center).abs() <= tolerance => {
                col.members.push((id, label));
                let sum: f64 = col.members.iter().map(|(_, b)| b.left).sum();
                col.center = sum / col.members.len() as f64;
            }
            _ => columns.push(Column {
                center: label.left,
                members: vec![(id, label)],
            }),
        }
    }
    columns
}

/// 计算题目 `target` 的裁剪矩形
///
/// 结果总在图片范围内，并且不小于 `min_width` x `min_height`
/// （图片本身更小时以图片尺寸为准）。本页没有该题标签时返回整页。
pub fn compute_crop(
    target: QuestionId,
    labels: &BTreeMap<QuestionId, LabelBox>,
    image_size: (u32, u32),
    settings: &CropSettings,
) -> CropRect {
    let Some(label) = labels.get(&target).copied() else {
        return CropRect::full(image_size);
    };
    let (img_w, img_h) = (image_size.0 as f64, image_size.1 as f64);

    let columns = cluster_columns(labels, settings.column_tolerance);
    let mut col_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, col) in columns.iter().enumerate() {
        let dist = (col.center - label.left).abs();
        if dist < best_dist {
            best_dist = dist;
            col_idx = idx;
        }
    }

    let column = &columns[col_idx];
    let left_bound = match col_idx.checked_sub(1) {
        Some(prev) => (columns[prev].center + column.center) / 2.0,
        None => 0.0,
    };
    let right_bound = match columns.get(col_idx + 1) {
        Some(next) => (column.center + next.center) / 2.0,
        None => img_w,
    };

    // 稳定排序：top 相同的成员保持聚类时的先后
    let mut by_top: Vec<(QuestionId, f64)> = column.members.iter().map(|(id, b)| (*id, b.top)).collect();
    by_top.sort_by(|a, b| a.1.total_cmp(&b.1));

    let next_top = by_top
        .iter()
        .map(|(_, top)| *top)
        .find(|top| *top > label.top + settings.next_item_margin);

    let top = (label.top - settings.padding_top).max(0.0);
    let bottom = match next_top {
        Some(next_top) => (top + settings.min_bottom_span).max(next_top - settings.padding_bottom),
        None => {
            let estimate = estimated_item_height(&by_top, target, img_h, settings);
            let span = (img_h * settings.max_height_ratio)
                .min(settings.min_estimated_height.max(estimate * settings.gap_multiplier));
            img_h.min(label.top + span)
        }
    };

    let left = (left_bound - settings.padding_x).floor().max(0.0);
    let right = (right_bound + settings.padding_x).floor().min(img_w);
    let width = (right - left).max(settings.min_width as f64);
    let height = (bottom - top).floor().max(settings.min_height as f64);

    clamp_to_image(left as u32, top.floor() as u32, width as u32, height as u32, image_size)
}

/// 列中最后一题的高度估计：列内题距（大于 `min_gap`）的中位数，
/// 其次是与列中前一个成员的距离（可以为 0），再其次按页面高度的固定比例
fn estimated_item_height(
    by_top: &[(QuestionId, f64)],
    target: QuestionId,
    img_h: f64,
    settings: &CropSettings,
) -> f64 {
    let mut gaps: Vec<f64> = by_top
        .windows(2)
        .map(|w| w[1].1 - w[0].1)
        .filter(|gap| *gap > settings.min_gap)
        .collect();
    if !gaps.is_empty() {
        gaps.sort_by(f64::total_cmp);
        return gaps[gaps.len() / 2];
    }

    let Some(idx) = by_top.iter().position(|(id, _)| *id == target) else {
        return img_h * settings.fallback_height_ratio;
    };
    match idx.checked_sub(1) {
        Some(prev) => by_top[idx].1 - by_top[prev].1,
        None => img_h * settings.fallback_height_ratio,
    }
}

/// 超出图片时整体向左/向上平移，图片比矩形还小时截到图片尺寸
fn clamp_to_image(left: u32, top: u32, width: u32, height: u32, image_size: (u32, u32)) -> CropRect {
    let (img_w, img_h) = image_size;
    let width = width.min(img_w);
    let height = height.min(img_h);
    CropRect {
        left: left.min(img_w - width),
        top: top.min(img_h - height),
        width,
        height,
    }
}
