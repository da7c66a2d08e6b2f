//! Prompt for CVE analysis

/// Build the analysis prompt for an identifier
///
/// The identifier is interpolated as-is; it is not checked against the CVE format.
pub fn build_analysis_prompt(cve_id: &str) -> String {
    format!(
        r#"You are a cybersecurity expert with access to up-to-date information. You **must run a web search** to find the latest information about the given CVE ID. Answer **only from facts found in the search results**, and **never produce uncertain or speculative information**.

Based on the search results, explain the vulnerability in detail using the JSON format below.

CVE ID: {cve_id}

You must respond only with valid JSON containing the following keys:
{{
  "cve_id": "{cve_id}",
  "summary": "One-line summary of the vulnerability",
  "vuln_type": "Specific vulnerability type including the CWE ID (e.g. CWE-416: Use After Free)",
  "description": "Detailed description of the vulnerability (how it occurs and what it affects)",
  "how_exploited": "Scenario describing how an attacker could exploit this vulnerability",
  "severity": "Severity including the CVSS score (e.g. High, CVSS 3.1: 9.8)",
  "impact": "Main consequences this vulnerability can cause",
  "recommendation": "Concrete response and mitigation steps for developers or system administrators",
  "references": [
      {{
          "title": "Title of a key official announcement, blog post, or technical document",
          "url": "URL of that resource"
      }}
  ]
}}

Keep each item to a concise 2-3 sentence summary. If you cannot find information for a particular item, leave it as an empty string ("")."#
    )
}
