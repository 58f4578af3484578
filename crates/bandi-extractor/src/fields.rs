//! Static per-field extraction specs

use bandi_domain::{Field, UNSPECIFIED};

/// How a field's answer is interpreted and validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Calendar date, answered as `DD/MM/YYYY`
    Date,
    /// Free text
    Text,
}

impl FieldKind {
    /// Whether `value` is an acceptable answer for this kind
    pub fn accepts(self, value: &str) -> bool {
        match self {
            FieldKind::Date => is_valid_date_answer(value),
            FieldKind::Text => !value.trim().is_empty(),
        }
    }
}

/// How to resolve one record field from the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Record slot this spec fills
    pub field: Field,
    /// Interpretation kind
    pub kind: FieldKind,
    /// Query sent to the retrieval backend
    pub retrieval_query: &'static str,
    /// What the model should look for
    pub instruction: &'static str,
    /// Shape of the expected answer
    pub expected_format: &'static str,
    /// Example answers
    pub examples: &'static str,
}

impl FieldSpec {
    /// Whether `value` passes this field's validator
    pub fn accepts(&self, value: &str) -> bool {
        self.kind.accepts(value)
    }
}

/// Syntactic date check: the sentinel, or exactly three `/`-separated parts
///
/// No calendar check happens here.
pub fn is_valid_date_answer(value: &str) -> bool {
    value == UNSPECIFIED || value.split('/').count() == 3
}

/// Fields resolved by retrieval, in extraction order
pub const STANDARD_FIELDS: [FieldSpec; 7] = [
    FieldSpec {
        field: Field::IssuingBody,
        kind: FieldKind::Text,
        retrieval_query: "ente erogatore regione lombardia direzione generale amministrazione decreto",
        instruction: "Individua l'ente che emette il bando: 'Regione Lombardia', 'DG', 'Direzione Generale', Camera di Commercio, Ministero.",
        expected_format: "Nome completo dell'ente",
        examples: "Regione Lombardia; Regione Lombardia - DG Sviluppo Economico; Camera di Commercio di Milano",
    },
    FieldSpec {
        field: Field::NoticeTitle,
        kind: FieldKind::Text,
        retrieval_query: "titolo avviso bando decreto oggetto denominazione",
        instruction: "Trova il titolo ufficiale e completo del bando, spesso dopo 'OGGETTO:' o 'AVVISO' oppure nell'intestazione.",
        expected_format: "Titolo completo senza abbreviazioni",
        examples: "BANDO SMART WORKING 2024; Avviso pubblico per contributi alla digitalizzazione delle PMI",
    },
    FieldSpec {
        field: Field::OpeningDate,
        kind: FieldKind::Date,
        retrieval_query: "apertura sportello presentazione domande inizio a partire dal giorno gennaio febbraio marzo aprile maggio giugno luglio agosto settembre ottobre novembre dicembre",
        instruction: "Trova il giorno da cui si possono presentare le domande: 'a partire dal', 'apertura sportello', 'dalle ore', 'dal giorno', 'presentazione domande dal'.",
        expected_format: "DD/MM/YYYY",
        examples: "15/01/2024; 01/02/2024; 28/03/2025",
    },
    FieldSpec {
        field: Field::ClosingDate,
        kind: FieldKind::Date,
        retrieval_query: "scadenza termine chiusura presentazione domande entro ultimo giorno ore gennaio febbraio marzo aprile maggio giugno luglio agosto settembre ottobre novembre dicembre",
        instruction: "Trova l'ultimo giorno utile per presentare domanda: 'entro il', 'termine', 'scadenza', 'fino al', 'chiusura sportello', 'ore 12:00 del'.",
        expected_format: "DD/MM/YYYY",
        examples: "31/12/2024; 30/06/2024; 30/04/2025",
    },
    FieldSpec {
        field: Field::TotalFunding,
        kind: FieldKind::Text,
        retrieval_query: "dotazione finanziaria budget stanziamento risorse disponibili totale euro",
        instruction: "Individua l'importo complessivo stanziato per il bando, sempre con il simbolo €.",
        expected_format: "Importo con simbolo €",
        examples: "€ 10.000.000; € 5.000.000,00; 2 milioni di euro",
    },
    FieldSpec {
        field: Field::Contribution,
        kind: FieldKind::Text,
        retrieval_query: "contributo massimo finanziamento importo agevolazione intensità aiuto percentuale",
        instruction: "Indica tipo e importo massimo del contributo per beneficiario, precisando se a fondo perduto o finanziamento agevolato.",
        expected_format: "Tipo e importo con €",
        examples: "Fino a € 100.000 a fondo perduto; 50% delle spese ammissibili, massimo € 200.000",
    },
    FieldSpec {
        field: Field::Beneficiaries,
        kind: FieldKind::Text,
        retrieval_query: "soggetti beneficiari destinatari possono partecipare requisiti PMI startup",
        instruction: "Elenca tutti i soggetti che possono partecipare al bando.",
        expected_format: "Elenco dei soggetti ammissibili",
        examples: "PMI lombarde; Micro e piccole imprese; Startup innovative con sede in Lombardia",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_validator() {
        assert!(is_valid_date_answer("31/12/2024"));
        assert!(!is_valid_date_answer("31-12-2024"));
        assert!(is_valid_date_answer(UNSPECIFIED));
        assert!(!is_valid_date_answer("31/12"));
        assert!(!is_valid_date_answer("1/1/2024/1"));
        // Syntactic only
        assert!(is_valid_date_answer("99/99/9999"));
    }

    #[test]
    fn test_text_kind_accepts_non_empty() {
        assert!(FieldKind::Text.accepts("PMI"));
        assert!(!FieldKind::Text.accepts("   "));
    }

    #[test]
    fn test_standard_fields_cover_retrievable_slots_once() {
        let fields: Vec<Field> = STANDARD_FIELDS.iter().map(|spec| spec.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::IssuingBody,
                Field::NoticeTitle,
                Field::OpeningDate,
                Field::ClosingDate,
                Field::TotalFunding,
                Field::Contribution,
                Field::Beneficiaries,
            ]
        );
    }

    #[test]
    fn test_only_dates_use_date_kind() {
        for spec in &STANDARD_FIELDS {
            let is_date = matches!(spec.field, Field::OpeningDate | Field::ClosingDate);
            assert_eq!(spec.kind == FieldKind::Date, is_date, "{}", spec.field);
            assert!(!spec.retrieval_query.is_empty());
        }
    }
}
