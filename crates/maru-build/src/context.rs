use crate::error::{BuildError, BuildResult};
use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tar::Builder;
use tempfile::NamedTempFile;
use tokio_util::io::ReaderStream;

/// ビルドコンテキストサイズの警告しきい値
const MAX_CONTEXT_SIZE: u64 = 500 * 1024 * 1024; // 500MB

pub struct ContextBuilder;

impl ContextBuilder {
    /// ディレクトリをtarアーカイブとして一時ファイルに書き出す
    ///
    /// 隠しファイルも含めて再帰的に追加する。返した [`ContextArchive`] を
    /// dropすると一時ファイルは削除される。
    #[tracing::instrument]
    pub fn package(context_path: &Path) -> BuildResult<ContextArchive> {
        tracing::debug!("Creating build context from: {}", context_path.display());

        let temp = tempfile::Builder::new()
            .prefix("maru_build_ctx_")
            .suffix(".tar")
            .tempfile()
            .map_err(BuildError::Packaging)?;
        tracing::debug!("Temporary build context at {}", temp.path().display());

        // 失敗時も `temp` のdropで一時ファイルは削除される
        {
            let mut tar = Builder::new(temp.as_file());
            tar.follow_symlinks(false);
            tar.append_dir_all(".", context_path)
                .map_err(BuildError::Packaging)?;
            tar.finish().map_err(BuildError::Packaging)?;
        }

        let mut reader = temp.reopen().map_err(BuildError::Packaging)?;
        reader
            .seek(SeekFrom::Start(0))
            .map_err(BuildError::Packaging)?;
        let size = reader.metadata().map_err(BuildError::Packaging)?.len();

        tracing::debug!("Build context created: {} bytes", size);
        Self::check_context_size(size);

        Ok(ContextArchive { temp, reader, size })
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: u64) {
        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "Build context is large ({}MB). Consider running maru from a smaller directory.",
                size / 1024 / 1024
            );
        }
    }
}

/// 一時ファイル上のビルドコンテキスト
///
/// `Read` または [`ContextArchive::into_stream`] で内容を読み出せる。
/// dropで一時ファイルを削除する。
pub struct ContextArchive {
    temp: NamedTempFile,
    reader: File,
    size: u64,
}

impl ContextArchive {
    /// アーカイブのバイト数
    pub fn size(&self) -> u64 {
        self.size
    }

    /// 一時ファイルのパス
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// 一時ファイルをチャンク単位で読み出すストリームに変換
    ///
    /// 一時ファイルはストリームがdropされるまで残る。
    pub fn into_stream(self) -> BoxStream<'static, std::io::Result<Bytes>> {
        let Self { temp, reader, size } = self;
        tracing::debug!("Streaming build context: {} bytes", size);

        let file = tokio::fs::File::from_std(reader);
        ReaderStream::new(file)
            .map(move |chunk| {
                let _keep_alive = &temp;
                chunk
            })
            .boxed()
    }
}

impl Read for ContextArchive {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}
