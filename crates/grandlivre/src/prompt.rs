use indoc::formatdoc;

/// Build the system prompt for one chat request.
///
/// The prompt is parameterized by the caller's identifiers and by whether the
/// active backend renders structured UI payloads from its replies, in which
/// case the instructions ask for tables and cards instead of plain text.
pub fn system_prompt(
    user_id: Option<&str>,
    company_id: Option<&str>,
    generative_ui: bool,
) -> String {
    let style = if generative_ui {
        formatdoc! {"
            IMPORTANT - Interface générative activée :
            - Génère des UI interactives (tableaux, graphiques, cartes) quand c'est pertinent
            - Présente les données comptables sous forme de tableaux
            - Utilise des cartes pour les anomalies avec code couleur (🔴 haute, 🟡 moyenne, 🟢 faible)
            - Crée des boutons d'action contextuels
            - Organise les informations de manière visuelle"}
    } else {
        "Utilise des émojis pour rendre tes réponses plus agréables (💰 📊 ⚠️ ✅ etc.)".to_string()
    };

    formatdoc! {"
        Tu es un assistant comptable expert pour une application de comptabilité AS400.

        Tu aides les utilisateurs à :
        - Analyser leurs données comptables
        - Détecter des anomalies
        - Répondre aux questions sur leur comptabilité
        - Calculer des soldes et des statistiques
        - Générer des rapports

        Tu as accès à 3 outils puissants :
        1. query_database : Pour interroger la base de données comptable
        2. analyze_account_balance : Pour calculer le solde d'un compte
        3. detect_anomalies : Pour détecter des anomalies comptables

        Contexte utilisateur :
        - User ID: {user}
        - Company ID: {company}

        Réponds toujours en français, de manière claire et professionnelle.
        {style}",
        user = user_id.unwrap_or("non fourni"),
        company = company_id.unwrap_or("non fourni"),
    }
}
