pub mod core;
pub mod analysis;
pub mod extract;
pub mod index;
pub mod search;

/*
┌────────────────────────────────────────────────────────────────────────────────────────────┐
│                               DOCDEX STRUCT ARCHITECTURE                                    │
└────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── CORE LAYER ──────────────────────────────────────────┐
│                                                                                              │
│  ┌────────────────────────────────────────────────────────────────────────────────────┐    │
│  │                                 struct Engine                                       │    │
│  │  ┌──────────────────────────────────────────────────────────────────────────────┐ │    │
│  │  │ config: Config                       // Snippet, OCR and timeout settings    │ │    │
│  │  │ extractor: Arc<Extractor>            // Bytes → tokens (blocking)            │ │    │
│  │  │ state: Arc<ActiveDocumentState>      // The one queryable document           │ │    │
│  │  └──────────────────────────────────────────────────────────────────────────────┘ │    │
│  └────────────────────────────────────────────────────────────────────────────────────┘    │
│                                                                                              │
│  ┌────────────────────────────────────────────────────────────────────────────────────┐    │
│  │                         struct ActiveDocumentState                                  │    │
│  │  ┌──────────────────────────────────────────────────────────────────────────────┐ │    │
│  │  │ inner: RwLock<ActiveDocument>        // index + trie + label, one lock       │ │    │
│  │  │ renderer: SnippetRenderer            // ≤ max_snippets windows               │ │    │
│  │  │ no_document_label: String            // Reported when nothing is active      │ │    │
│  │  └──────────────────────────────────────────────────────────────────────────────┘ │    │
│  └────────────────────────────────────────────────────────────────────────────────────┘    │
│                                                                                              │
│  ┌──────────────────┐  ┌──────────────────────┐  ┌─────────────────────────────────┐      │
│  │ struct Config    │  │ enum DocumentFormat  │  │ enum CatalogEvent               │      │
│  │ • max_snippets   │  │ • PlainText          │  │ • DocumentActivated{label,blob} │      │
│  │ • context_window │  │ • Docx               │  │ • DocumentRemoved{label}        │      │
│  │ • min_text_layer │  │ • Xlsx               │  └─────────────────────────────────┘      │
│  │ • ocr_*          │  │ • Pdf                │                                            │
│  └──────────────────┘  └──────────────────────┘                                            │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────── RELATIONSHIPS ────────────────────────────────────────────┐
│                                                                                              │
│  Engine ──owns──> Extractor ──dispatches──> plain / docx / xlsx / pdf                       │
│     │                 │                                          │                          │
│     │                 └──normalizes_with──> Analyzer             └──uses──> PdfTextSource   │
│     │                                                                   (text layer, OCR)   │
│     ├──builds──> PositionalIndex ──serializes──> IndexBlob ──> metadata store               │
│     │                                                                                       │
│     └──owns──> ActiveDocumentState ──holds──> PositionalIndex + Trie + label               │
│                        │                                                                    │
│                        └──renders_with──> SnippetRenderer ──returns──> SearchResults       │
│                                                                                              │
└──────────────────────────────────────────────────────────────────────────────────────────────┘
*/
