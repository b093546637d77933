//! Лог агента через MemoryLogger
//!
//! Отдельный test binary: logger глобальный, поэтому один тест на процесс.

use brainrot_simulation::sandbox::demo_level;
use brainrot_simulation::*;

#[test]
fn test_agent_log_lines_respect_level() {
    let memory = MemoryLogger::new();
    set_logger(Box::new(memory.clone()));
    set_log_level(LogLevel::Debug);

    // Ошибка конфигурации — error уровень
    let config = SahurConfig::default();
    let (mut world, layout) = demo_level(&config.layers);
    let mut broken = SahurController::new(config.clone(), LevelLayout::default(), 1);
    assert!(broken.initialize(&mut world.context()).is_err());
    assert!(memory.contains("setup failed"));
    assert_eq!(memory.count_at(LogLevel::Error), 1);

    // Переход — info с timestamp
    let mut sahur = SahurController::new(config.clone(), layout.clone(), 1);
    sahur.initialize(&mut world.context()).expect("demo level is valid");
    assert!(memory.contains("Initializing → Idle"));
    assert!(memory
        .lines()
        .iter()
        .any(|(level, line)| *level == LogLevel::Info && line.starts_with('[')));

    // Warning-уровень отсекает info
    memory.clear();
    set_log_level(LogLevel::Warning);
    let mut quiet = SahurController::new(config, layout, 2);
    quiet.initialize(&mut world.context()).expect("demo level is valid");
    assert!(!memory.contains("Initializing → Idle"));
    assert_eq!(memory.count_at(LogLevel::Info), 0);

    set_log_level(LogLevel::Debug);
}
