// ==========================================
// 配置管理器集成测试
// ==========================================
// 覆盖: 按文件路径打开 / 跨实例持久化 / 默认值
// ==========================================


use fleet_scorecard::config::{config_keys, ConfigError, ConfigManager, PipelineSettings};
use fleet_scorecard::repository::DEFAULT_PAGE_SIZE;
use test_helpers::*;

#[test]
fn test_config_manager_opens_by_path_and_persists() {
    let (_temp_file, db_path) = create_test_db().unwrap();

    let writer = ConfigManager::new(&db_path).unwrap();
    let defaults = writer.load_pipeline_settings().unwrap();
    assert_eq!(defaults, PipelineSettings::default());
    assert_eq!(defaults.page_size, DEFAULT_PAGE_SIZE);

    writer
        .set_global_config_value(config_keys::INSERT_CHUNK_SIZE, "50")
        .unwrap();
    writer
        .set_global_config_value(config_keys::MIN_LOGIN_TRIPS, " 2 ")
        .unwrap();

    // 新实例读取同一数据库文件
    let reader = ConfigManager::new(&db_path).unwrap();
    assert_eq!(
        reader
            .get_global_config_value(config_keys::INSERT_CHUNK_SIZE)
            .unwrap()
            .as_deref(),
        Some("50")
    );
    let settings = reader.load_pipeline_settings().unwrap();
    assert_eq!(settings.insert_chunk_size, 50);
    assert_eq!(settings.min_login_trips, 2);
    assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
}

#[test]
fn test_config_manager_rejects_negative_threshold() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    manager
        .set_global_config_value(config_keys::MIN_LOGIN_TRIPS, "-1")
        .unwrap();
    assert!(matches!(
        manager.load_pipeline_settings(),
        Err(ConfigError::InvalidValue { .. })
    ));
}
