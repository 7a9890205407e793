// ============================================================
// Layer 5 — Judgment Client
// ============================================================
// Submits one document plus its evidence to the reasoning
// service and always comes back with a Verdict.
//
// The system prompt is fixed and demands pure JSON in the
// Verdict schema. The user message embeds the evidence block,
// the document identity, the declared gross amount and the
// body — nothing else, so the audit is reproducible from the
// artifacts alone.
//
// Failure policy: once the client exists (credentials were
// checked at backend construction), judge() cannot fail. A
// backend error degrades the document to an ERREUR verdict so
// a batch never stops on one bad document.
//
// Cost model: a fixed linear price per token,
//   cost = input_tokens * rate_in + output_tokens * rate_out
// rounded to 5 decimal places. Computed from the usage the
// service reports, never from the reply text.
//
// Reference: Rust Book §10 (Trait Objects)

use rust_decimal::Decimal;

use crate::domain::document::Document;
use crate::domain::traits::ReasoningService;
use crate::domain::verdict::{UsageMeta, Verdict};
use crate::judgment::parser::parse_verdict;

/// The fixed audit instruction. The schema spelled out here is
/// the same one domain::verdict decodes.
const SYSTEM_PROMPT: &str = "\
Tu es un agent de conformité comptable expert en droit fiscal français.

Tu reçois un corpus de normes légales (KOS) et une facture à auditer.
Réponds UNIQUEMENT en JSON pur selon ce format exact :

{
  \"verdict\": \"CONFORME\" | \"REJET\" | \"AVERTISSEMENT\",
  \"motif\": \"explication courte et précise\",
  \"articles_appliques\": [\"référence légale\"],
  \"corrections_requises\": [\"correction si applicable\"],
  \"imputation_recommandee\": {
    \"compte_debit\": \"XXXXX\",
    \"compte_credit\": \"XXXXX\",
    \"montant_ht\": 0.00,
    \"tva_deductible\": 0.00,
    \"tva_non_deductible\": 0.00,
    \"montant_ttc\": 0.00
  },
  \"niveau_risque\": \"FAIBLE\" | \"MOYEN\" | \"ELEVE\",
  \"action_erp\": \"INJECTER\" | \"BLOQUER\" | \"REVUE_HUMAINE\"
}";

pub struct JudgmentClient {
    backend: Box<dyn ReasoningService>,
    rate_input: Decimal,
    rate_output: Decimal,
}

impl JudgmentClient {
    pub fn new(
        backend: Box<dyn ReasoningService>,
        rate_input: Decimal,
        rate_output: Decimal,
    ) -> Self {
        Self { backend, rate_input, rate_output }
    }

    /// Audit one document against its evidence. Infallible: every
    /// failure mode ends in an ERREUR verdict with empty usage.
    pub fn judge(&self, document: &Document, evidence: &str) -> Verdict {
        let user_message = build_user_message(document, evidence);

        match self.backend.complete(SYSTEM_PROMPT, &user_message) {
            Ok(completion) => {
                let mut verdict = parse_verdict(&completion.text);
                verdict.usage = UsageMeta {
                    llm:             completion.model,
                    input_tokens:    completion.input_tokens,
                    output_tokens:   completion.output_tokens,
                    cout_estime_eur: self.cost(completion.input_tokens, completion.output_tokens),
                };
                verdict
            }
            Err(e) => {
                tracing::warn!("Judgment backend failed for '{}': {e}", document.filename);
                Verdict::erreur(format!("service de jugement indisponible : {e}"))
            }
        }
    }

    /// Linear cost estimate in EUR, rounded to 5 decimal places.
    fn cost(&self, input_tokens: u64, output_tokens: u64) -> Decimal {
        (Decimal::from(input_tokens) * self.rate_input
            + Decimal::from(output_tokens) * self.rate_output)
            .round_dp(5)
    }
}

/// The user half of the prompt: evidence first, then the
/// document's identity and declared amounts, then its body.
fn build_user_message(document: &Document, evidence: &str) -> String {
    format!(
        "## NORMES KOS\n{evidence}\n\n\
         ## DOCUMENT\n\
         Fichier : {fichier}\n\
         Tags : {tags}\n\
         Montant TTC : {ttc}\n\n\
         {corps}\n\n\
         Audite et réponds en JSON.",
        fichier = document.filename,
        tags    = document.tags_joined(),
        ttc     = document.declared_gross(),
        corps   = document.body,
    )
}
