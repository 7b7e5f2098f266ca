//! 通用工具函数

use uuid::Uuid;

/// 生成实体主键（UUID v7，按创建时间有序，适合作为索引列）
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_time_ordered() {
        let first = new_id();
        let second = new_id();
        assert_eq!(first.get_version_num(), 7);
        assert!(first < second);
    }
}
