// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 联系页关键词
///
/// 覆盖西班牙语、英语、法语、德语、意大利语、葡萄牙语以及通用词汇。
/// 匹配时对路径做小写处理，因此这里全部使用小写。
pub const CONTACT_KEYWORDS: &[&str] = &[
    // es
    "contact",
    "contacto",
    "about",
    "info",
    "acerca",
    "informacion",
    "información",
    "equipo",
    "team",
    "nosotros",
    "empresa",
    "quienes-somos",
    // en
    "contact-us",
    "about-us",
    "support",
    "help",
    "reach",
    "get-in-touch",
    "who-we-are",
    "our-team",
    "meet-team",
    "staff",
    "office",
    "headquarters",
    // fr
    "nous-contacter",
    "au-sujet",
    "à-propos",
    "propos",
    "équipe",
    "qui-sommes-nous",
    "notre-équipe",
    "mentions-legales",
    "aide",
    "assistance",
    "bureau",
    // de
    "kontakt",
    "kontaktiere",
    "kontaktieren",
    "über-uns",
    "über",
    "ueber",
    "impressum",
    "unser-team",
    "wir",
    "firma",
    "unternehmen",
    "hilfe",
    "unterstützung",
    "büro",
    // it
    "contatti",
    "chi-siamo",
    "su-di-noi",
    "squadra",
    "ufficio",
    "informazioni",
    "aiuto",
    "supporto",
    "sede",
    // pt
    "contato",
    "sobre",
    "sobre-nos",
    "equipe",
    "time",
    "quem-somos",
    "informacoes",
    "ajuda",
    "suporte",
    "escritorio",
    // generic
    "people",
    "directory",
    "location",
    "address",
    "phone",
    "email",
    "reach-us",
    "get-help",
    "customer-service",
    "atendimento",
    "servicio-cliente",
];

/// 判断路径是否像联系/关于页面
///
/// 只用于决定遍历优先级，不会据此拒绝任何页面。
pub fn is_contact_link(path: &str) -> bool {
    let lower = path.to_lowercase();
    CONTACT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_common_contact_paths() {
        assert!(is_contact_link("/contact"));
        assert!(is_contact_link("/en/about-us/"));
        assert!(is_contact_link("/Kontakt"));
        assert!(is_contact_link("/IMPRESSUM.html"));
        assert!(is_contact_link("/chi-siamo"));
        assert!(is_contact_link("/quem-somos"));
        assert!(is_contact_link("/company/staff-directory"));
    }

    #[test]
    fn test_non_ascii_keywords_match_case_insensitively() {
        assert!(is_contact_link("/de/Über-Uns"));
        assert!(is_contact_link("/fr/Équipe"));
    }

    #[test]
    fn test_ordinary_paths_do_not_match() {
        assert!(!is_contact_link("/"));
        assert!(!is_contact_link("/blog/2024/03/release-notes"));
        assert!(!is_contact_link("/products/widgets"));
    }

    #[test]
    fn test_keyword_table_is_lowercase_and_multilingual() {
        assert!(CONTACT_KEYWORDS.len() >= 45);
        for keyword in CONTACT_KEYWORDS {
            assert_eq!(*keyword, keyword.to_lowercase());
        }
    }
}
