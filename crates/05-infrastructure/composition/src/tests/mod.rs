//! 组合层单元测试

mod widget_tests;
