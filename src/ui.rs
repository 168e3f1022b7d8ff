use crate::models::GalleryItem;

pub const PROMPT_MESSAGE: &str = "Upload today's gratitude photo to continue.";
pub const DONE_MESSAGE: &str = "Today's photo is done! View your gallery.";

pub fn status_message(uploaded: bool) -> &'static str {
    if uploaded { DONE_MESSAGE } else { PROMPT_MESSAGE }
}

/// The gallery is shown once today's photo exists.
pub fn render_index(date: &str, uploaded: bool, gallery: &[GalleryItem]) -> String {
    let items: String = gallery.iter().map(render_item).collect();
    INDEX_HTML
        .replace("{{DATE}}", &escape_html(date))
        .replace("{{STATUS}}", &escape_html(status_message(uploaded)))
        .replace("{{GALLERY_HIDDEN}}", if uploaded { "" } else { "hidden" })
        .replace("{{GALLERY}}", &items)
}

fn render_item(item: &GalleryItem) -> String {
    let date = escape_html(&item.date);
    let image = if item.photo.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img src="{}" alt="Photo from {date}" loading="lazy" />"#,
            escape_html(&item.photo)
        )
    };
    format!(
        r#"<figure class="gallery-item" data-date="{date}">
        {image}
        <figcaption>
          <p class="entry-date">Date: {date}</p>
          <p class="entry-note">{note}</p>
          <button class="btn-delete" type="button" data-date="{date}">Delete</button>
        </figcaption>
      </figure>
"#,
        note = escape_html(&item.note),
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Gratitude Photo</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --danger: #d32f2f;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f5c57;
    }

    .uploader {
      display: grid;
      gap: 14px;
    }

    textarea {
      width: 100%;
      min-height: 80px;
      border-radius: 16px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 12px;
      font: inherit;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      color: white;
    }

    button:disabled {
      opacity: 0.6;
      cursor: progress;
    }

    .btn-upload {
      background: var(--accent);
      box-shadow: 0 10px 24px rgba(255, 107, 74, 0.3);
    }

    .btn-delete {
      background: var(--danger);
      padding: 8px 14px;
      font-size: 0.9rem;
      margin-top: 5px;
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    .gallery {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
      gap: 16px;
    }

    .gallery-item {
      margin: 0;
      background: white;
      border-radius: 18px;
      padding: 12px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .gallery-item img {
      width: 100%;
      border-radius: 12px;
      display: block;
    }

    .gallery-item p {
      margin: 6px 0 0;
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Daily Gratitude Photo</h1>
      <p class="subtitle">One photo a day, for <span id="date">{{DATE}}</span>.</p>
    </header>

    <section class="uploader">
      <input id="photo-input" type="file" accept="image/*" capture="environment" />
      <textarea id="note-input" placeholder="What are you grateful for?"></textarea>
      <button class="btn-upload" id="upload-btn" type="button">Upload</button>
      <div class="status" id="status-message">{{STATUS}}</div>
    </section>

    <section id="gallery-section" {{GALLERY_HIDDEN}}>
      <h2>Gallery</h2>
      <div class="gallery" id="gallery">
{{GALLERY}}      </div>
    </section>
  </main>

  <script>
    const photoInput = document.getElementById('photo-input');
    const noteInput = document.getElementById('note-input');
    const uploadBtn = document.getElementById('upload-btn');
    const statusEl = document.getElementById('status-message');
    const gallerySection = document.getElementById('gallery-section');
    const galleryEl = document.getElementById('gallery');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const errorMessage = async (res) => {
      try {
        const body = await res.json();
        return body.error || 'Request failed';
      } catch (_) {
        return 'Request failed';
      }
    };

    const renderGallery = (items) => {
      galleryEl.innerHTML = '';
      items.forEach((item) => {
        const figure = document.createElement('figure');
        figure.className = 'gallery-item';

        if (item.photo) {
          const img = document.createElement('img');
          img.src = item.photo;
          img.alt = `Photo from ${item.date}`;
          figure.appendChild(img);
        }

        const caption = document.createElement('figcaption');
        const dateP = document.createElement('p');
        dateP.textContent = `Date: ${item.date}`;
        caption.appendChild(dateP);

        const noteP = document.createElement('p');
        noteP.textContent = item.note;
        caption.appendChild(noteP);

        const del = document.createElement('button');
        del.className = 'btn-delete';
        del.type = 'button';
        del.dataset.date = item.date;
        del.textContent = 'Delete';
        caption.appendChild(del);

        figure.appendChild(caption);
        galleryEl.appendChild(figure);
      });
    };

    const loadGallery = async () => {
      const res = await fetch('/api/entries');
      if (!res.ok) {
        throw new Error(await errorMessage(res));
      }
      renderGallery(await res.json());
    };

    const deleteEntry = async (date) => {
      if (!confirm(`Delete photo from ${date}?`)) {
        return;
      }
      const res = await fetch(`/api/entries/${date}`, { method: 'DELETE' });
      if (!res.ok) {
        throw new Error(await errorMessage(res));
      }
      const body = await res.json();
      await loadGallery();
      if (body.reopened_today) {
        setStatus(body.message, '');
        gallerySection.hidden = true;
      }
    };

    galleryEl.addEventListener('click', (event) => {
      const button = event.target.closest('.btn-delete');
      if (button) {
        deleteEntry(button.dataset.date).catch((err) => setStatus(err.message, 'error'));
      }
    });

    uploadBtn.addEventListener('click', async () => {
      const form = new FormData();
      const file = photoInput.files[0];
      if (file) {
        form.append('photo', file);
      }
      form.append('note', noteInput.value);

      uploadBtn.disabled = true;
      setStatus('Uploading...', '');
      try {
        const res = await fetch('/api/upload', { method: 'POST', body: form });
        if (!res.ok) {
          throw new Error(await errorMessage(res));
        }
        const body = await res.json();
        setStatus(body.message, 'ok');
        photoInput.value = '';
        noteInput.value = '';
        gallerySection.hidden = false;
        await loadGallery();
      } catch (err) {
        setStatus(err.message, 'error');
      } finally {
        uploadBtn.disabled = false;
      }
    });
  </script>
</body>
</html>
"#;
