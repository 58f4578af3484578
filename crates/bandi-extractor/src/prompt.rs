//! LLM prompt engineering for grant-notice extraction
//!
//! Every prompt is written in Italian, like the notices, and asks for the
//! sentinel when the answer is not in the text.

use crate::dates::ITALIAN_MONTHS;
use crate::fields::{FieldKind, FieldSpec};
use bandi_domain::UNSPECIFIED;

/// Marker the date re-search uses for a date it could not find
pub const NOT_FOUND_MARKER: &str = "Non trovata";

/// Builds the interpretation prompt for one field
pub struct PromptBuilder<'a> {
    spec: &'a FieldSpec,
    context: String,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder over the retrieved fragments
    pub fn new(spec: &'a FieldSpec, context: impl Into<String>) -> Self {
        Self {
            spec,
            context: context.into(),
        }
    }

    /// Build the prompt for the spec's kind
    pub fn build(&self) -> String {
        match self.spec.kind {
            FieldKind::Date => self.build_date(),
            FieldKind::Text => self.build_text(),
        }
    }

    fn build_date(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Dai seguenti contesti, estrai la data di {} del bando.\n\n",
            self.spec.field.key().to_lowercase()
        ));
        push_section(&mut prompt, "CONTESTI TROVATI", &self.context);
        push_section(&mut prompt, "ISTRUZIONI SPECIFICHE", self.spec.instruction);

        prompt.push_str("IMPORTANTE per l'estrazione delle date:\n");
        prompt.push_str(
            "1. Se trovi una data in formato testuale (es. \"28 marzo 2025\", \"15 aprile\"), convertila in DD/MM/YYYY\n",
        );
        prompt.push_str(
            "2. Se manca l'anno, deducilo dal contesto (cerca riferimenti come \"campagna 2025\", \"bando 2025-2026\")\n",
        );
        prompt.push_str(&format!("3. Mesi in italiano: {}\n", month_table()));
        prompt.push_str(DATE_CONVERSION_EXAMPLES);
        prompt.push_str("\n\n");

        prompt.push_str(&format!("FORMATO RICHIESTO: {}\n\n", self.spec.expected_format));
        prompt.push_str(&format!(
            "Rispondi SOLO con la data nel formato DD/MM/YYYY. Se non trovi la data, rispondi \"{}\".",
            UNSPECIFIED
        ));
        prompt
    }

    fn build_text(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Dai seguenti contesti, estrai SOLO il valore per \"{}\".\n\n",
            self.spec.field.key()
        ));
        push_section(&mut prompt, "CONTESTI TROVATI", &self.context);
        push_section(&mut prompt, "ISTRUZIONI SPECIFICHE", self.spec.instruction);
        push_section(&mut prompt, "FORMATO ATTESO", self.spec.expected_format);
        push_section(&mut prompt, "ESEMPI DI VALORI VALIDI", self.spec.examples);

        prompt.push_str(&format!(
            "Rispondi SOLO con il valore estratto. Se non trovi l'informazione, rispondi \"{}\".",
            UNSPECIFIED
        ));
        prompt
    }
}

/// `gennaio=01, febbraio=02, ...`
fn month_table() -> String {
    ITALIAN_MONTHS
        .iter()
        .map(|(name, number)| format!("{}={:02}", name, number))
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_section(prompt: &mut String, title: &str, body: &str) {
    prompt.push_str(title);
    prompt.push_str(":\n");
    prompt.push_str(body);
    prompt.push_str("\n\n");
}

const DATE_CONVERSION_EXAMPLES: &str = r#"4. Esempi di conversione:
   - "28 marzo 2025" → "28/03/2025"
   - "dal 15 aprile" (in un bando 2025) → "15/04/2025"
   - "entro il 30 giugno 2025" → "30/06/2025""#;

/// Summary of what the notice funds
pub fn description_prompt(
    excerpt: &str,
    issuing_body: &str,
    title: &str,
    beneficiaries: &str,
) -> String {
    format!(
        "Basandoti su questo estratto del bando e sui dati già estratti, crea una descrizione sintetica (max 150 parole) di cosa finanzia il bando.\n\n\
         ESTRATTO DOCUMENTO:\n{}\n\n\
         DATI GIÀ ESTRATTI:\nEnte: {}\nTitolo: {}\nBeneficiari: {}\n\n\
         Descrivi: obiettivi principali, cosa viene finanziato, finalità del bando.",
        excerpt, issuing_body, title, beneficiaries
    )
}

/// 5-7 comma-separated keywords
pub fn keywords_prompt(title: &str, beneficiaries: &str, excerpt: &str) -> String {
    format!(
        "Estrai 5-7 parole chiave che caratterizzano questo bando.\n\n\
         TITOLO: {}\nBENEFICIARI: {}\n\n\
         ESTRATTO:\n{}\n\n\
         Rispondi SOLO con le parole chiave separate da virgola.",
        title, beneficiaries, excerpt
    )
}

/// Targeted search for both submission dates over a document excerpt
pub fn date_search_prompt(excerpt: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "Nel seguente documento, trova le date di apertura e chiusura per la presentazione delle domande.\n\n",
    );
    push_section(&mut prompt, "DOCUMENTO", excerpt);
    prompt.push_str(DATE_SEARCH_HINTS);
    prompt.push_str("\n\nRispondi in questo formato:\n");
    prompt.push_str(&format!(
        "Apertura: [data in formato DD/MM/YYYY o \"{0}\"]\nChiusura: [data in formato DD/MM/YYYY o \"{0}\"]",
        NOT_FOUND_MARKER
    ));
    prompt
}

const DATE_SEARCH_HINTS: &str = r#"Cerca con attenzione:
- Date in formato testuale (es. "28 marzo", "15 aprile 2025")
- Riferimenti a "apertura sportello", "presentazione domande dal"
- Riferimenti a "scadenza", "termine ultimo", "chiusura sportello"
- Orari specifici (es. "ore 12:00 del 30 aprile")

Se trovi date in formato testuale, convertile in DD/MM/YYYY.
Se manca l'anno, deducilo dal contesto (campagna 2025, bando 2025-2026, etc.)"#;

/// Whole-record verification against a document excerpt
pub fn cross_check_prompt(record_json: &str, excerpt: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("Verifica questi dati estratti confrontandoli con il documento.\n");
    prompt.push_str("Se trovi informazioni mancanti o errate, correggile.\n\n");
    push_section(&mut prompt, "DATI ESTRATTI", record_json);
    push_section(&mut prompt, "ESTRATTO DOCUMENTO PER VERIFICA", excerpt);
    prompt.push_str("Rispondi SOLO con il JSON corretto e completo. Non aggiungere spiegazioni.");
    prompt
}
