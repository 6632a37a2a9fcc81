//! Keyword-driven category classification with canned advice templates.
//!
//! Used when live generation is unavailable or produced nothing usable: the
//! article's title and body are scored against per-category keyword lists
//! and the best-matching template is customized with whatever concrete
//! details (product names, CVE ids) the text gives up. Fully deterministic
//! for a given input.

use lazy_static::lazy_static;
use regex::Regex;

use ct_core::Tips;

lazy_static! {
    static ref PRODUCT_NAME: Regex = Regex::new(r"\b([A-Z][a-z]+(?:\s[A-Z][a-z]+)*)\b").unwrap();
    static ref CVE_ID: Regex = Regex::new(r"CVE-\d{4}-\d{4,}").unwrap();
}

struct Category {
    name: &'static str,
    keywords: &'static [&'static str],
    summary: &'static str,
    dos: [&'static str; 4],
    donts: [&'static str; 4],
}

impl Category {
    fn template(&self) -> Tips {
        Tips {
            summary: self.summary.to_string(),
            dos: self.dos.iter().map(|s| s.to_string()).collect(),
            donts: self.donts.iter().map(|s| s.to_string()).collect(),
        }
    }
}

const CATEGORIES: &[Category] = &[
    Category {
        name: "vulnerability",
        keywords: &["vulnerability", "cve", "exploit", "patch", "bug", "flaw", "weakness"],
        summary: "This article discusses critical vulnerability issues that could be exploited if left unaddressed. Organizations should prioritize applying security patches to mitigate potential risks.",
        dos: [
            "Apply security patches immediately as they become available",
            "Implement recommended workarounds if patches aren't yet available",
            "Monitor vendor security bulletins for updates on these vulnerabilities",
            "Run vulnerability scans regularly to identify affected systems",
        ],
        donts: [
            "Don't ignore critical vulnerability notifications related to your systems",
            "Don't leave vulnerable systems exposed to the internet unnecessarily",
            "Don't delay security updates for critical production systems",
            "Don't run outdated software with known security vulnerabilities",
        ],
    },
    Category {
        name: "malware",
        keywords: &["malware", "virus", "trojan", "ransomware", "botnet", "backdoor", "worm"],
        summary: "This article addresses malware threats that can compromise system security and data integrity. Organizations should implement robust malware protection measures.",
        dos: [
            "Deploy comprehensive anti-malware solutions across all systems",
            "Maintain offline backups of critical data to protect against ransomware",
            "Scan all downloaded files before opening them",
            "Implement application whitelisting where practical",
        ],
        donts: [
            "Don't open email attachments or click links from untrusted sources",
            "Don't disable security software even temporarily",
            "Don't pay ransoms if infected with ransomware - it encourages attackers",
            "Don't run applications from unknown or untrusted sources",
        ],
    },
    Category {
        name: "phishing",
        keywords: &["phishing", "social engineering", "scam", "spam", "fraud", "impersonation"],
        summary: "This article highlights phishing attack techniques that attempt to steal sensitive information through deception. Users should exercise caution with unexpected communications.",
        dos: [
            "Verify sender identities before responding to requests for information",
            "Inspect URLs carefully before clicking on links in emails or messages",
            "Report suspected phishing attempts to your security team",
            "Use multi-factor authentication for all important accounts",
        ],
        donts: [
            "Don't click on links in unsolicited emails, even if they appear legitimate",
            "Don't provide personal or financial information in response to email requests",
            "Don't rush decisions when pressured to act quickly by email or phone",
            "Don't ignore warning signs like spelling errors or suspicious sender addresses",
        ],
    },
    Category {
        name: "data_breach",
        keywords: &["breach", "leak", "stolen data", "exposed data", "compromised"],
        summary: "This article discusses a data breach incident where sensitive information was compromised. Organizations should take immediate steps to protect affected users and prevent similar incidents.",
        dos: [
            "Change passwords for any accounts mentioned in breach notifications",
            "Monitor your accounts and credit reports for suspicious activity",
            "Enable breach alerts and notifications for your accounts",
            "Consider using a password manager to create and store unique credentials",
        ],
        donts: [
            "Don't ignore breach notifications related to your accounts or data",
            "Don't reuse passwords across multiple sites or services",
            "Don't share sensitive personal information unnecessarily",
            "Don't use easily guessable security questions for account recovery",
        ],
    },
    Category {
        name: "network_security",
        keywords: &["network", "firewall", "router", "protocol", "vpn", "traffic"],
        summary: "This article covers network security vulnerabilities that could allow unauthorized access. Network administrators should review their security configurations to address these issues.",
        dos: [
            "Implement network segmentation to contain potential breaches",
            "Configure firewalls with strict rules following the principle of least privilege",
            "Enable encryption for all sensitive network traffic",
            "Regularly audit network devices and configurations for security issues",
        ],
        donts: [
            "Don't expose network management interfaces to the public internet",
            "Don't use default credentials for network devices",
            "Don't neglect regular firmware updates for network infrastructure",
            "Don't overlook the security of remote access solutions",
        ],
    },
    Category {
        name: "authentication",
        keywords: &["password", "authentication", "credentials", "login", "mfa", "2fa"],
        summary: "This article highlights authentication vulnerabilities that could lead to account compromise. Organizations should strengthen their authentication mechanisms.",
        dos: [
            "Implement multi-factor authentication for all user accounts",
            "Use strong, unique passwords for each account or service",
            "Consider adopting passwordless authentication methods where appropriate",
            "Regularly audit user access rights and permissions",
        ],
        donts: [
            "Don't share account credentials between multiple users",
            "Don't store passwords in plaintext or insecurely",
            "Don't allow lengthy session durations without re-authentication",
            "Don't rely solely on password-based authentication for sensitive systems",
        ],
    },
    Category {
        name: "encryption",
        keywords: &["encryption", "cryptography", "cipher", "encrypted", "decrypt"],
        summary: "This article discusses encryption issues that could potentially expose sensitive data. Organizations should review their cryptographic implementations.",
        dos: [
            "Use industry-standard encryption algorithms and protocols",
            "Implement end-to-end encryption for sensitive communications",
            "Properly manage encryption keys with secure storage and rotation",
            "Encrypt data both in transit and at rest",
        ],
        donts: [
            "Don't use outdated or deprecated encryption algorithms",
            "Don't implement custom cryptographic solutions without expert review",
            "Don't store encryption keys alongside the encrypted data",
            "Don't overlook encrypted backup solutions for sensitive data",
        ],
    },
    Category {
        name: "zero_day",
        keywords: &["zero-day", "0day", "unpatched", "unknown vulnerability"],
        summary: "This article reveals details about a zero-day vulnerability with no available patch. Organizations should implement mitigations and closely monitor affected systems.",
        dos: [
            "Implement recommended workarounds from security researchers or vendors",
            "Monitor affected systems closely for signs of exploitation",
            "Apply network-level protections to filter malicious traffic",
            "Prepare incident response procedures in case of exploitation",
        ],
        donts: [
            "Don't ignore zero-day vulnerability announcements",
            "Don't delay implementing mitigations where patches aren't available",
            "Don't expose vulnerable systems directly to the internet",
            "Don't wait for a patch before taking protective measures",
        ],
    },
    Category {
        name: "compliance",
        keywords: &["compliance", "regulation", "gdpr", "hipaa", "pci", "policy"],
        summary: "This article addresses regulatory compliance issues in cybersecurity. Organizations should assess their practices to ensure they meet legal and industry requirements.",
        dos: [
            "Maintain documentation of security controls and practices",
            "Conduct regular compliance audits and assessments",
            "Stay informed about regulatory changes affecting your industry",
            "Implement data governance frameworks appropriate to your organization",
        ],
        donts: [
            "Don't ignore compliance deadlines or regulatory notifications",
            "Don't collect more user data than necessary for business purposes",
            "Don't overlook third-party vendor compliance requirements",
            "Don't implement security controls without considering regulatory frameworks",
        ],
    },
    Category {
        name: "iot_security",
        keywords: &["iot", "smart device", "connected device", "smart home"],
        summary: "This article highlights security weaknesses in IoT devices that could be exploited. Users and organizations should take steps to secure their connected devices.",
        dos: [
            "Change default passwords on all IoT devices immediately",
            "Keep device firmware updated with the latest security patches",
            "Isolate IoT devices on separate network segments",
            "Disable unnecessary features and services on smart devices",
        ],
        donts: [
            "Don't connect sensitive IoT devices directly to the internet",
            "Don't ignore security in favor of convenience when setting up devices",
            "Don't leave unused IoT devices powered on and connected",
            "Don't overlook physical security for important IoT installations",
        ],
    },
    Category {
        name: "cloud_security",
        keywords: &["cloud", "aws", "azure", "gcp", "saas", "cloud storage"],
        summary: "This article covers cloud security challenges that could lead to data exposure. Cloud service users should review their configurations to protect their assets.",
        dos: [
            "Implement the principle of least privilege for cloud resource access",
            "Enable multi-factor authentication for all cloud service accounts",
            "Regularly audit cloud configurations for security misconfigurations",
            "Use cloud security posture management tools to identify risks",
        ],
        donts: [
            "Don't leave cloud storage buckets publicly accessible",
            "Don't hardcode credentials in application code or scripts",
            "Don't overlook security responsibilities in your cloud service agreements",
            "Don't neglect to encrypt sensitive data stored in the cloud",
        ],
    },
    Category {
        name: "mobile_security",
        keywords: &["mobile", "android", "ios", "smartphone", "app"],
        summary: "This article identifies security issues affecting mobile devices and applications. Users should take precautions to protect their mobile devices and data.",
        dos: [
            "Keep mobile operating systems and apps updated with security patches",
            "Only install applications from official app stores",
            "Use biometric authentication where available",
            "Encrypt sensitive data stored on mobile devices",
        ],
        donts: [
            "Don't jailbreak or root devices used for sensitive activities",
            "Don't grant excessive permissions to mobile applications",
            "Don't connect to untrusted public Wi-Fi networks without a VPN",
            "Don't store sensitive unencrypted data on mobile devices",
        ],
    },
];

const GENERAL: Category = Category {
    name: "general",
    keywords: &[],
    summary: "This article covers important cybersecurity topics that require attention. Following general security best practices can help mitigate these risks.",
    dos: [
        "Keep all systems and software updated with security patches",
        "Implement defense-in-depth security strategies with multiple protective layers",
        "Regularly back up critical data following the 3-2-1 rule",
        "Conduct regular security awareness training for all users",
    ],
    donts: [
        "Don't overlook basic security controls in favor of advanced solutions",
        "Don't reuse credentials across different systems or services",
        "Don't provide users with more access rights than necessary",
        "Don't ignore security alerts or unusual system behavior",
    ],
};

/// The classification outcome: the selected categories and the customized
/// advice template.
#[derive(Debug, Clone)]
pub struct Classification {
    pub primary: &'static str,
    pub secondary: Option<&'static str>,
    pub tips: Tips,
}

/// Classify an article by keyword frequency and produce templated advice.
/// A keyword hit in the title weighs three times a hit in the body.
pub fn classify(title: &str, content: &str) -> Classification {
    let title_lower = title.to_lowercase();
    let content_lower = content.to_lowercase();

    let mut scored: Vec<(&Category, u32)> = CATEGORIES
        .iter()
        .filter_map(|category| {
            let mut score = 0;
            for keyword in category.keywords {
                if title_lower.contains(keyword) {
                    score += 3;
                }
                if content_lower.contains(keyword) {
                    score += 1;
                }
            }
            (score > 0).then_some((category, score))
        })
        .collect();
    // stable sort keeps table order on ties
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let Some((primary, _)) = scored.first() else {
        let mut tips = GENERAL.template();
        customize_general(&mut tips, title);
        return Classification {
            primary: GENERAL.name,
            secondary: None,
            tips: tips.normalized(),
        };
    };
    let secondary = scored.get(1).map(|(category, _)| *category);

    let mut tips = primary.template();
    customize(&mut tips, primary.name, title, content);
    if let Some(secondary) = secondary {
        // blend one item from the runner-up category
        tips.dos.truncate(3);
        tips.dos.push(secondary.dos[0].to_string());
        tips.donts.truncate(3);
        tips.donts.push(secondary.donts[0].to_string());
    }

    Classification {
        primary: primary.name,
        secondary: secondary.map(|category| category.name),
        tips: tips.normalized(),
    }
}

/// Substitute concrete details (a product name, a CVE id) into the
/// template when the text carries them.
fn customize(tips: &mut Tips, primary: &str, title: &str, content: &str) {
    let product = PRODUCT_NAME
        .captures(title)
        .map(|caps| caps[1].to_string());
    let haystack = format!("{} {}", title, content);
    let cve = CVE_ID.find(&haystack).map(|m| m.as_str().to_string());

    let Some(product) = product else {
        return;
    };

    match primary {
        "vulnerability" => {
            tips.summary = format!(
                "This article discusses critical vulnerabilities affecting {} that could be exploited if left unaddressed. Users of these systems should apply security patches immediately.",
                product
            );
            tips.dos[0] = format!(
                "Apply the latest security patches for {} as soon as possible",
                product
            );
            if let Some(cve) = cve {
                tips.summary = format!(
                    "This article reveals details about {}, a vulnerability affecting {}. Users should apply patches to mitigate exploitation risks.",
                    cve, product
                );
                tips.dos[2] = format!("Monitor vendor advisories for {} regarding {}", product, cve);
            }
        }
        "malware" => {
            tips.summary = format!(
                "This article discusses malware threats targeting {} systems. Users should implement protective measures to safeguard against infection.",
                product
            );
            tips.dos[0] = format!(
                "Ensure anti-malware solutions are updated and configured to protect {} systems",
                product
            );
        }
        _ => {}
    }
}

fn customize_general(tips: &mut Tips, title: &str) {
    let key_terms: Vec<&str> = title
        .split_whitespace()
        .filter(|word| word.len() > 4 && word.chars().next().is_some_and(char::is_uppercase))
        .take(2)
        .collect();
    if !key_terms.is_empty() {
        tips.summary = format!(
            "This article discusses cybersecurity issues related to {}. Following security best practices can help mitigate associated risks.",
            key_terms.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_hits_outweigh_body_hits() {
        // one title keyword (3) beats two body keywords (2)
        let classified = classify(
            "New phishing campaign observed",
            "the malware dropped a trojan payload",
        );
        assert_eq!(classified.primary, "phishing");
        assert_eq!(classified.secondary, Some("malware"));
    }

    #[test]
    fn test_no_hits_selects_general() {
        let classified = classify("Quarterly report released", "nothing security related");
        assert_eq!(classified.primary, "general");
        assert!(classified.secondary.is_none());
        assert_eq!(classified.tips.dos.len(), 4);
    }

    #[test]
    fn test_general_summary_uses_title_terms() {
        let classified = classify("Quarterly Figures for Example", "plain text");
        assert_eq!(classified.primary, "general");
        assert!(classified.tips.summary.contains("Quarterly"));
    }

    #[test]
    fn test_vulnerability_customized_with_cve() {
        let classified = classify(
            "Critical Router vulnerability disclosed",
            "Tracked as CVE-2025-12345, the flaw allows remote code execution.",
        );
        assert_eq!(classified.primary, "vulnerability");
        assert!(classified.tips.summary.contains("CVE-2025-12345"));
        assert!(classified.tips.dos[0].contains("Critical Router"));
    }

    #[test]
    fn test_secondary_category_blended() {
        let classified = classify(
            "Ransomware gang exploits unpatched vulnerability",
            "victims urged to patch",
        );
        assert_eq!(classified.tips.dos.len(), 4);
        assert_eq!(classified.tips.donts.len(), 4);
        let secondary = classified.secondary.expect("expected a runner-up");
        assert_ne!(classified.primary, secondary);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let a = classify("Phishing wave", "malware everywhere");
        let b = classify("Phishing wave", "malware everywhere");
        assert_eq!(a.primary, b.primary);
        assert_eq!(a.tips, b.tips);
    }
}
