//! Shared fixtures for integration tests.

#![allow(dead_code)]

use md5::{Digest, Md5};
use pdfoutline::{LayoutLine, PageLayout, StyledSpan};

/// One positioned string on a synthetic PDF page.
pub struct Run {
    /// `F1` is Helvetica, `F2` is Helvetica-Bold
    pub font: &'static str,
    pub size: f32,
    pub y: f32,
    pub text: &'static str,
}

pub fn run(font: &'static str, size: f32, y: f32, text: &'static str) -> Run {
    Run {
        font,
        size,
        y,
        text,
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Build a PDF with one page per entry of `pages`, with a valid xref table.
pub fn build_pdf(pages: &[Vec<Run>]) -> Vec<u8> {
    assemble(pages, None)
}

/// Like [`build_pdf`], with the standard security handler (RC4, revision 2,
/// 40-bit key) protecting the content streams under `user_password`.
pub fn build_encrypted_pdf(pages: &[Vec<Run>], user_password: &[u8]) -> Vec<u8> {
    assemble(pages, Some(user_password))
}

fn assemble(pages: &[Vec<Run>], user_password: Option<&[u8]>) -> Vec<u8> {
    let security = user_password.map(Security::new);
    let mut objects: Vec<Vec<u8>> = Vec::new();

    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 5 + i * 2))
        .collect();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .into_bytes(),
    );
    objects.push(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );
    objects.push(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );

    for (i, runs) in pages.iter().enumerate() {
        let content_obj = 6 + i * 2;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                content_obj
            )
            .into_bytes(),
        );

        let content: String = runs
            .iter()
            .map(|r| {
                format!(
                    "BT /{} {} Tf 72 {} Td ({}) Tj ET\n",
                    r.font,
                    r.size,
                    r.y,
                    escape(r.text)
                )
            })
            .collect();
        let data = match &security {
            Some(s) => s.encrypt(content_obj as u32, content.as_bytes()),
            None => content.into_bytes(),
        };

        let mut stream = format!("<< /Length {} >>\nstream\n", data.len()).into_bytes();
        stream.extend_from_slice(&data);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut trailer_extra = String::new();
    if let Some(s) = &security {
        objects.push(s.dictionary().into_bytes());
        trailer_extra = format!(
            " /Encrypt {} 0 R /ID [<{}> <{}>]",
            objects.len(),
            hex(FILE_ID),
            hex(FILE_ID)
        );
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R{} >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            trailer_extra,
            xref_offset
        )
        .as_bytes(),
    );

    out
}

const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];
const FILE_ID: &[u8] = b"pdfoutline-fixed-id";
const PERMISSIONS: i32 = -4;
/// Stands in for the owner password hash, which readers never check.
const OWNER_ENTRY: [u8; 32] = [0x4F; 32];

/// Standard security handler, revision 2.
struct Security {
    key: Vec<u8>,
    user_entry: Vec<u8>,
}

impl Security {
    fn new(user_password: &[u8]) -> Self {
        let len = user_password.len().min(32);
        let mut hasher = Md5::new();
        hasher.update(&user_password[..len]);
        hasher.update(&PASSWORD_PADDING[..32 - len]);
        hasher.update(OWNER_ENTRY);
        hasher.update(PERMISSIONS.to_le_bytes());
        hasher.update(FILE_ID);
        let key = hasher.finalize()[..5].to_vec();

        let user_entry = rc4(&key, &PASSWORD_PADDING);
        Self { key, user_entry }
    }

    /// RC4 with the per-object key.
    fn encrypt(&self, object: u32, data: &[u8]) -> Vec<u8> {
        let mut hasher = Md5::new();
        hasher.update(&self.key);
        hasher.update(&object.to_le_bytes()[..3]);
        hasher.update([0u8, 0u8]);
        let digest = hasher.finalize();
        rc4(&digest[..self.key.len() + 5], data)
    }

    fn dictionary(&self) -> String {
        format!(
            "<< /Filter /Standard /V 1 /R 2 /O <{}> /U <{}> /P {} >>",
            hex(&OWNER_ENTRY),
            hex(&self.user_entry),
            PERMISSIONS
        )
    }
}

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut s: Vec<u8> = (0..=255).collect();
    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
        s.swap(i, j as usize);
    }

    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(s[i as usize]);
            s.swap(i as usize, j as usize);
            let k = s[i as usize].wrapping_add(s[j as usize]);
            byte ^ s[k as usize]
        })
        .collect()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// A two-page report: bold title, numbered sections and body text.
pub fn report_pdf() -> Vec<u8> {
    build_pdf(&report_pages())
}

pub fn report_pages() -> Vec<Vec<Run>> {
    vec![
        vec![
            run("F2", 24.0, 720.0, "Annual Report 2024"),
            run("F1", 10.0, 690.0, "This report covers the fiscal year"),
            run("F1", 10.0, 676.0, "and the outlook for the next one"),
            run("F2", 16.0, 640.0, "1. Introduction"),
            run("F1", 10.0, 610.0, "Body paragraph text goes here"),
            run("F1", 10.0, 596.0, "with a second line of body text"),
        ],
        vec![
            run("F2", 16.0, 720.0, "2. Results"),
            run("F1", 10.0, 690.0, "Results body text follows here"),
            run("F1", 10.0, 676.0, "and continues for another line"),
            run("F1", 14.0, 640.0, "2.1. Revenue Growth"),
            run("F1", 10.0, 610.0, "Revenue grew in every region"),
            run("F1", 10.0, 596.0, "except for the smallest market"),
        ],
    ]
}

/// In-memory page from `(text, size, bold)` lines.
pub fn page(lines: &[(&str, f32, bool)]) -> PageLayout {
    PageLayout::from_lines(
        lines
            .iter()
            .map(|&(text, size, bold)| {
                let span = StyledSpan::new(text, size);
                LayoutLine::single(if bold { span.bold() } else { span })
            })
            .collect(),
    )
}
