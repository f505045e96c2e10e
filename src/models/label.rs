use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::question::QuestionId;

/// 页面尺寸（PDF 点）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// `pdftotext -bbox` 输出中的一个单词
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub text: String,
}

/// 题号标签的左上角（PDF 点）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelPoint {
    pub x: f64,
    pub y: f64,
}

/// 题号标签的外框（已换算到图片像素）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl LabelBox {
    pub fn from_word(word: &Word) -> Self {
        Self {
            left: word.x_min,
            top: word.y_min,
            right: word.x_max,
            bottom: word.y_max,
        }
    }

    /// 两个单词拼成的标签（例如 "A" + "7"）
    pub fn union(&self, other: &LabelBox) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn scaled(&self, scale_x: f64, scale_y: f64) -> Self {
        Self {
            left: self.left * scale_x,
            top: self.top * scale_y,
            right: self.right * scale_x,
            bottom: self.bottom * scale_y,
        }
    }
}

/// `label_positions_<year>.json` 的内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPositionsFile {
    pub page_sizes: BTreeMap<u32, PageSize>,
    pub labels: BTreeMap<u32, BTreeMap<QuestionId, LabelPoint>>,
}

/// 裁剪矩形（像素，整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn full(image_size: (u32, u32)) -> Self {
        Self {
            left: 0,
            top: 0,
            width: image_size.0,
            height: image_size.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_positions_json_shape() {
        let mut file = LabelPositionsFile::default();
        file.page_sizes.insert(
            1,
            PageSize {
                width: 595.0,
                height: 842.0,
            },
        );
        let mut labels = BTreeMap::new();
        labels.insert("A1".parse().unwrap(), LabelPoint { x: 56.5, y: 102.0 });
        file.labels.insert(1, labels);

        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["pageSizes"]["1"]["width"], 595.0);
        assert_eq!(value["labels"]["1"]["A1"]["x"], 56.5);
        assert_eq!(value["labels"]["1"]["A1"]["y"], 102.0);
    }

    #[test]
    fn test_union_and_scale() {
        let a = LabelBox {
            left: 10.0,
            top: 20.0,
            right: 18.0,
            bottom: 30.0,
        };
        let b = LabelBox {
            left: 20.0,
            top: 19.0,
            right: 26.0,
            bottom: 29.0,
        };
        let u = a.union(&b).scaled(2.0, 0.5);
        assert_eq!(
            u,
            LabelBox {
                left: 20.0,
                top: 9.5,
                right: 52.0,
                bottom: 15.0
            }
        );
    }

    #[test]
    fn test_full_crop_covers_image() {
        let rect = CropRect::full((640, 900));
        assert_eq!((rect.left, rect.top), (0, 0));
        assert_eq!((rect.width, rect.height), (640, 900));
    }
}
