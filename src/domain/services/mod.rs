// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - 爬取服务（crawl_service）：同主机内的有界深度遍历与邮箱提取
/// - 链接分类（link_classifier）：判断路径是否像联系页
/// - 扫描服务（scan_service）：缓存优先的扫描流程
pub mod crawl_service;
pub mod link_classifier;
pub mod scan_service;
